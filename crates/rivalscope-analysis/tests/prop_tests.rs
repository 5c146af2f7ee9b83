use proptest::prelude::*;
use serde_json::json;

use rivalscope_analysis::prelude::*;

fn payload(summary: &str) -> String {
    json!({
        "profiles": [], "features": [], "pricing": [], "seo": [], "swot": {},
        "tech_stacks": [], "market_positioning": {},
        "summary": summary, "recommendations": []
    })
    .to_string()
}

fn arb_url() -> impl Strategy<Value = String> {
    ("[a-z]{1,10}", "(com|io|dev)").prop_map(|(name, tld)| format!("https://{name}.{tld}"))
}

proptest! {
    /// Clean JSON passes through fence stripping unchanged.
    #[test]
    fn strip_fences_is_identity_on_clean_json(summary in "[a-zA-Z0-9 `]{0,30}") {
        let raw = payload(&summary);
        prop_assert_eq!(strip_fences(&raw), raw.as_str());
        prop_assert_eq!(strip_fences(strip_fences(&raw)), raw.as_str());
    }

    /// A wrapped payload hydrates to the same body as the bare one.
    #[test]
    fn wrapped_payload_matches_bare(summary in "[a-zA-Z0-9 `]{0,30}", tagged in prop::bool::ANY) {
        let raw = payload(&summary);
        let tag = if tagged { "json" } else { "" };
        let wrapped = format!("```{tag}\n{raw}\n```");
        let bare = hydrate(&raw, "https://acme.com", &[]).unwrap();
        let fenced = hydrate(&wrapped, "https://acme.com", &[]).unwrap();
        prop_assert_eq!(bare.body, fenced.body);
    }

    /// Hydrated reports echo the requested URLs exactly.
    #[test]
    fn hydrate_echoes_urls(primary in arb_url(), competitors in prop::collection::vec(arb_url(), 0..=4)) {
        let report = hydrate(&payload("s"), &primary, &competitors).unwrap();
        prop_assert_eq!(report.primary_url, primary);
        prop_assert_eq!(report.competitors, competitors);
    }

    /// Any strict prefix of a valid payload is rejected.
    #[test]
    fn truncated_payload_is_rejected(cut in 1usize..60) {
        let raw = payload("truncated");
        let end = raw.len().saturating_sub(cut).max(1);
        prop_assert!(hydrate(&raw[..end], "https://acme.com", &[]).is_err());
    }

    /// Density never exceeds the number of features.
    #[test]
    fn density_is_bounded(flags in prop::collection::vec(prop::option::of(prop::bool::ANY), 0..12)) {
        let features: Vec<_> = flags
            .iter()
            .enumerate()
            .map(|(i, flag)| {
                let availability = match flag {
                    Some(f) => json!({"https://acme.com": f}),
                    None => json!({}),
                };
                json!({"name": format!("f{i}"), "availability": availability})
            })
            .collect();
        let raw = json!({
            "profiles": [], "features": features, "pricing": [], "seo": [], "swot": {},
            "tech_stacks": [], "market_positioning": {}, "summary": "", "recommendations": []
        })
        .to_string();
        let report = hydrate(&raw, "https://acme.com", &[]).unwrap();
        let density = feature_density(&report);
        let expected = flags.iter().filter(|f| **f == Some(true)).count();
        prop_assert_eq!(density[0].count, expected);
        prop_assert!(density[0].count <= flags.len());
    }
}
