// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LANGUAGE: &str = "en";

// Os dicionários vão embutidos no binário; não dependemos de arquivos em disco no deploy.
const EMBEDDED_LOCALES: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens traduzidas, indexadas por idioma e chave ("errors.not_found").
#[derive(Debug, Default)]
pub struct I18nStore {
    bundles: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load_embedded() -> anyhow::Result<Self> {
        let mut store = Self::default();
        for (lang, raw) in EMBEDDED_LOCALES {
            let bundle: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Arquivo de idioma '{}' inválido", lang))?;
            store.bundles.insert(lang.to_string(), bundle);
        }
        Ok(store)
    }

    /// Busca a chave no idioma pedido, depois em inglês; se nada existir devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANGUAGE, key))
            .map(str::to_owned)
            .unwrap_or_else(|| key.to_string())
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.bundles.get(lang)?.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_english_key_has_a_portuguese_translation() {
        let store = I18nStore::load_embedded().unwrap();
        let en = &store.bundles["en"];
        let pt = &store.bundles["pt"];
        for key in en.keys() {
            assert!(pt.contains_key(key), "chave sem tradução em pt: {}", key);
        }
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::load_embedded().unwrap();
        assert_eq!(
            store.translate("de", "errors.service_not_found"),
            store.translate("en", "errors.service_not_found")
        );
        assert!(!store.bundles.contains_key("de"));
    }

    #[test]
    fn missing_key_returns_the_key() {
        let store = I18nStore::load_embedded().unwrap();
        assert_eq!(store.translate("pt", "errors.does_not_exist"), "errors.does_not_exist");
    }

    #[test]
    fn portuguese_differs_from_english() {
        let store = I18nStore::load_embedded().unwrap();
        assert_ne!(
            store.translate("pt", "errors.invalid_credentials"),
            store.translate("en", "errors.invalid_credentials")
        );
    }
}
