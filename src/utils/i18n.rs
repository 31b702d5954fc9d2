use crate::config::DEFAULT_LOCALE;
use tracing::warn;

/// Locales shipped in `locales/`
const AVAILABLE: &[&str] = &["en"];

/// Shipped locale matching `locale` by base language, if any
fn resolve_locale(locale: &str) -> Option<&'static str> {
    let base = locale.split(['-', '_']).next().unwrap_or(locale);
    AVAILABLE
        .iter()
        .copied()
        .find(|available| available.eq_ignore_ascii_case(base))
}

/// Set the locale for assistant messages, falling back to English for unknown ones
pub fn set_locale(locale: &str) {
    match resolve_locale(locale) {
        Some(resolved) => rust_i18n::set_locale(resolved),
        None => {
            warn!("Locale {} not available, using {}", locale, DEFAULT_LOCALE);
            rust_i18n::set_locale(DEFAULT_LOCALE);
        }
    }
}
