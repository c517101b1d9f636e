// ==========================================
// Internationalisation (i18n)
// ==========================================
// rust-i18n, français par défaut, anglais en second catalogue.
// Les messages de conflit passent tous par ce module.
// ==========================================
// Note: la macro rust_i18n::i18n! est initialisée dans lib.rs
// ==========================================

/// Langue courante.
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Change la langue.
///
/// # Paramètres
/// - locale: code de langue ("fr" ou "en")
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Traduit un message sans paramètre.
///
/// # Exemple
/// ```no_run
/// use bloc_planning::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Traduit un message avec paramètres nommés.
///
/// Les occurrences de %{nom} sont remplacées par la valeur fournie.
///
/// # Exemple
/// ```no_run
/// use bloc_planning::i18n::t_with_args;
/// let msg = t_with_args("conflicts.personnel_absent", &[("person", "A. Durand")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
