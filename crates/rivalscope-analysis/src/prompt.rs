use serde_json::Value;

use crate::request::AnalysisRequest;

/// JSON string literal for a URL, quotes and escapes included.
fn quoted(url: &str) -> String {
    Value::from(url).to_string()
}

/// One `"<url>": <value>` line per URL in scope, comma separated.
fn keyed_block(urls: &[&str], value: &str, indent: &str) -> String {
    urls.iter()
        .map(|url| format!("{indent}{}: {value}", quoted(url)))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Render the generation instruction for a request.
///
/// Pure and deterministic. Every URL appears verbatim, and the example
/// object uses those exact strings as its map keys.
pub fn build_instruction(request: &AnalysisRequest) -> String {
    let urls = request.urls();
    let competitors = if request.competitors.is_empty() {
        "none (analyze the primary company on its own)".to_string()
    } else {
        request.competitors.join(", ")
    };
    let url_list = urls
        .iter()
        .map(|u| quoted(u))
        .collect::<Vec<_>>()
        .join(", ");

    let availability = keyed_block(&urls, "true", "            ");
    let swot = keyed_block(
        &urls,
        r#"{ "strengths": ["..."], "weaknesses": ["..."], "opportunities": ["..."], "threats": ["..."] }"#,
        "    ",
    );
    let positioning = keyed_block(&urls, r#"{ "x": 50, "y": 50 }"#, "    ");

    format!(
        r##"You are an expert Competitor Analysis Engine.

Your task is to analyze the following websites deeply using Google Search to find their features, pricing, SEO details, and strategic positioning.

Primary Company: {primary}
Competitors: {competitors}

Perform the following steps:
1. Search for the homepage, pricing page, and features page for each domain.
2. Extract a list of distinct features. Normalize them into canonical buckets (e.g., "Login with Google" -> "SSO") and record the bucket in "canonical_feature".
3. Determine feature availability for EACH company (true/false, or a short string for partial support).
4. Extract pricing tiers with an explicit currency and billing cycle, and whether a free trial exists. Use an empty "tiers" list when pricing is custom quote only.
5. Estimate SEO health based on public signals: "page_speed_score" from 0 to 100, "meta_description_health" one of "Good", "Fair", "Poor", "blog_freshness" one of "High", "Medium", "Low".
6. Perform a SWOT analysis for EACH company based on public perception and feature gaps.
7. Infer the likely tech stack (frontend, backend, analytics) from typical patterns or job postings found in search.
8. Score each company from 0 to 100 on two axes: "x" is Innovation and "y" is Market Presence.

Use exactly these strings as the company keys in "availability", "swot", and "market_positioning", and as every "url" value: {url_list}

The JSON object must contain exactly these top-level fields: "profiles", "features", "pricing", "seo", "swot", "tech_stacks", "market_positioning", "summary", "recommendations".

Return ONLY a valid JSON object matching this structure. Do not include any prose, explanation, or markdown formatting such as code fences.

{{
  "profiles": [
    {{ "url": "...", "name": "...", "description": "...", "colors": ["#hex"] }}
  ],
  "features": [
    {{
      "name": "...",
      "canonical_feature": "...",
      "confidence": 0.9,
      "evidence_snippet": "...",
      "availability": {{
{availability}
      }}
    }}
  ],
  "pricing": [
    {{
      "url": "...",
      "has_free_trial": true,
      "currency": "USD",
      "tiers": [
        {{ "tier_name": "Starter", "price": "$10", "billing_cycle": "month", "features_included": ["..."] }}
      ]
    }}
  ],
  "seo": [
    {{
      "url": "...",
      "page_speed_score": 85,
      "meta_description_health": "Good",
      "schema_types": ["Organization", "Product"],
      "blog_freshness": "High",
      "mobile_friendly": true
    }}
  ],
  "swot": {{
{swot}
  }},
  "tech_stacks": [
    {{ "url": "...", "frontend": ["React"], "backend": ["Python"], "analytics": ["GA4"] }}
  ],
  "market_positioning": {{
{positioning}
  }},
  "summary": "A brief executive summary comparison...",
  "recommendations": ["Actionable advice 1", "Actionable advice 2"]
}}
"##,
        primary = request.primary_url,
    )
}
