//! Static price and capability tables for the vendor model families.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
    api_types::{Capabilities, Cost, ModelMetadata},
    provider::ModelFamily,
};

/// Family level defaults, used as-is for ids the family table does not list.
struct FamilyProfile {
    modality: &'static str,
    latency: u64,
    popularity: u64,
    capabilities: Capabilities,
}

struct CatalogEntry {
    cost: Cost,
    capabilities: Option<Capabilities>,
}

const OPENAI: FamilyProfile = FamilyProfile {
    modality: "text",
    latency: 100,
    popularity: 1000,
    capabilities: Capabilities::TEXT_ONLY,
};

const CLAUDE: FamilyProfile = FamilyProfile {
    modality: "text",
    latency: 80,
    popularity: 800,
    capabilities: Capabilities::TEXT_AND_VISION,
};

const GEMINI: FamilyProfile = FamilyProfile {
    modality: "multimodal",
    latency: 60,
    popularity: 600,
    capabilities: Capabilities::TEXT_AND_VISION,
};

static OPENAI_MODELS: Lazy<HashMap<&'static str, CatalogEntry>> = Lazy::new(|| {
    HashMap::from([
        (
            "gpt-4",
            CatalogEntry {
                cost: Cost::new(0.03, 0.06),
                capabilities: Some(Capabilities::TEXT_AND_VISION),
            },
        ),
        (
            "gpt-4-turbo",
            CatalogEntry {
                cost: Cost::new(0.01, 0.03),
                capabilities: Some(Capabilities::TEXT_AND_VISION),
            },
        ),
        (
            "gpt-3.5-turbo",
            CatalogEntry {
                cost: Cost::new(0.001, 0.002),
                capabilities: Some(Capabilities::TEXT_ONLY),
            },
        ),
    ])
});

static CLAUDE_MODELS: Lazy<HashMap<&'static str, CatalogEntry>> = Lazy::new(|| {
    HashMap::from([
        ("claude-3-opus", priced(0.015, 0.075)),
        ("claude-3-sonnet", priced(0.003, 0.015)),
        ("claude-3-haiku", priced(0.00025, 0.00125)),
    ])
});

static GEMINI_MODELS: Lazy<HashMap<&'static str, CatalogEntry>> = Lazy::new(|| {
    HashMap::from([
        ("gemini-pro", priced(0.00025, 0.0005)),
        ("gemini-pro-vision", priced(0.00025, 0.0005)),
    ])
});

fn priced(input: f64, output: f64) -> CatalogEntry {
    CatalogEntry {
        cost: Cost::new(input, output),
        capabilities: None,
    }
}

/// Metadata for a vendor model. Unknown ids inside a known family get the family defaults and
/// zero cost. Returns `None` for huggingface, which has no static table.
pub fn lookup(family: ModelFamily, model_id: &str) -> Option<ModelMetadata> {
    let (profile, table) = match family {
        ModelFamily::OpenAi => (&OPENAI, &*OPENAI_MODELS),
        ModelFamily::Claude => (&CLAUDE, &*CLAUDE_MODELS),
        ModelFamily::Gemini => (&GEMINI, &*GEMINI_MODELS),
        ModelFamily::HuggingFace => return None,
    };

    let entry = table.get(model_id);
    Some(ModelMetadata {
        modality: profile.modality.to_owned(),
        latency: profile.latency,
        popularity: profile.popularity,
        cost: entry.map(|e| e.cost).unwrap_or_default(),
        capabilities: entry
            .and_then(|e| e.capabilities)
            .unwrap_or(profile.capabilities),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gpt_4_is_priced_and_multimodal() {
        let metadata = lookup(ModelFamily::OpenAi, "gpt-4").unwrap();
        assert_eq!(metadata.cost, Cost::new(0.03, 0.06));
        assert_eq!(metadata.capabilities, Capabilities::TEXT_AND_VISION);
        assert_eq!(metadata.modality, "text");
    }

    #[test]
    fn gpt_35_is_text_only() {
        let metadata = lookup(ModelFamily::OpenAi, "gpt-3.5-turbo").unwrap();
        assert_eq!(metadata.cost, Cost::new(0.001, 0.002));
        assert_eq!(metadata.capabilities, Capabilities::TEXT_ONLY);
    }

    #[test]
    fn unknown_openai_id_gets_family_default() {
        let metadata = lookup(ModelFamily::OpenAi, "text-embedding-3-small").unwrap();
        assert_eq!(metadata.cost, Cost::default());
        assert_eq!(metadata.capabilities, Capabilities::TEXT_ONLY);
        assert_eq!(metadata.latency, 100);
        assert_eq!(metadata.popularity, 1000);
    }

    #[test]
    fn claude_and_gemini_share_vision_capabilities() {
        let opus = lookup(ModelFamily::Claude, "claude-3-opus").unwrap();
        assert_eq!(opus.cost, Cost::new(0.015, 0.075));
        assert_eq!(opus.capabilities, Capabilities::TEXT_AND_VISION);

        let unknown_claude = lookup(ModelFamily::Claude, "claude-2.1").unwrap();
        assert_eq!(unknown_claude.cost, Cost::default());
        assert_eq!(unknown_claude.capabilities, Capabilities::TEXT_AND_VISION);

        let gemini = lookup(ModelFamily::Gemini, "gemini-pro-vision").unwrap();
        assert_eq!(gemini.modality, "multimodal");
        assert_eq!(gemini.cost, Cost::new(0.00025, 0.0005));
        assert_eq!(gemini.latency, 60);
    }

    #[test]
    fn huggingface_has_no_table() {
        assert_eq!(lookup(ModelFamily::HuggingFace, "gpt2"), None);
    }
}
