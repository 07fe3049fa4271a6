//! Internationalization (i18n) module.
//!
//! Provides localized strings for CLI help and console messages.
//! English is the default language; Spanish is available as an alternative.
//! Reports rendered by the library stay in English.

use std::sync::OnceLock;

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// English (default)
    En,
    /// Spanish
    Es,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "es", "en_US", "es_ES").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-', '.']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from `PUL_MIGRATE_LANG`, `LC_MESSAGES` or `LANG`.
pub fn detect_system_lang() -> Lang {
    std::env::var("PUL_MIGRATE_LANG")
        .ok()
        .and_then(|v| Lang::from_code(&v))
        .or_else(|| {
            std::env::var("LC_MESSAGES")
                .ok()
                .and_then(|v| Lang::from_code(&v))
        })
        .or_else(|| std::env::var("LANG").ok().and_then(|v| Lang::from_code(&v)))
        .unwrap_or(Lang::En)
}

/// Macro for defining translatable message functions.
/// Each function returns a `&'static str` based on the current language.
macro_rules! msg {
    ($name:ident, $en:expr, $es:expr) => {
        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            match lang() {
                Lang::En => $en,
                Lang::Es => $es,
            }
        }
    };
}

// ── General ──────────────────────────────────────────────────────

msg!(
    app_about,
    "Carry trophy progress from an old Settings.pul save into a new one.",
    "Traslada el progreso de trofeos de un Settings.pul antiguo a uno nuevo."
);
msg!(
    app_long_about,
    "Carry trophy progress from an old Settings.pul save into a new one.\nTracks are matched by identifier; cup counters are recomputed and\nthe patched save is written next to the inputs.",
    "Traslada el progreso de trofeos de un Settings.pul antiguo a uno nuevo.\nLas pistas se emparejan por identificador; los contadores de copas se\nrecalculan y el fichero parcheado se escribe junto a las entradas."
);

// ── CLI help strings ─────────────────────────────────────────────

msg!(
    help_cmd_migrate,
    "Merge old progress into the new save (default if no subcommand given)",
    "Combinar el progreso antiguo con el fichero nuevo (por defecto si no se da subcomando)"
);
msg!(
    help_cmd_inspect,
    "Show the trophy header and completed tracks of one save",
    "Mostrar la cabecera de trofeos y las pistas completadas de un fichero"
);
msg!(
    help_cmd_init_config,
    "Write a default configuration file",
    "Escribir un fichero de configuraci\u{f3}n por defecto"
);
msg!(
    help_cmd_completions,
    "Generate shell completions",
    "Generar autocompletado para la shell"
);
msg!(
    help_cmd_manpage,
    "Generate a man page",
    "Generar una p\u{e1}gina de manual"
);

// ── Console messages ─────────────────────────────────────────────

msg!(
    err_missing_files,
    "One of the Settings.pul or track list text files are missing",
    "Falta uno de los ficheros Settings.pul o de listas de pistas"
);
msg!(
    msg_expected_names,
    "Name them",
    "N\u{f3}mbralos"
);
msg!(msg_not_found, "Not found", "No encontrado");
msg!(msg_merge_complete, "Merge complete:", "Combinaci\u{f3}n completa:");
msg!(msg_carried, "Tracks carried over", "Pistas trasladadas");
msg!(
    msg_dropped,
    "Tracks missing from new save",
    "Pistas ausentes en el fichero nuevo"
);
msg!(msg_output_size, "Output size", "Tama\u{f1}o de salida");
msg!(msg_output_file, "Output file", "Fichero de salida");
msg!(
    msg_dry_run,
    "Dry run: nothing written",
    "Simulaci\u{f3}n: no se ha escrito nada"
);
msg!(msg_version, "Version", "Versi\u{f3}n");
msg!(msg_total_size, "Declared size", "Tama\u{f1}o declarado");
msg!(msg_track_count, "Track entries", "Entradas de pista");
msg!(
    msg_stored_counters,
    "Stored counters",
    "Contadores almacenados"
);
msg!(
    msg_config_written,
    "Configuration written to",
    "Configuraci\u{f3}n escrita en"
);
