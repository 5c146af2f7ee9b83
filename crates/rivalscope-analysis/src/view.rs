//! Read-only derivations the report renderer needs.
//!
//! Everything here is a pure function of an [`AnalysisReport`] and is
//! recomputed on demand.

use std::fmt;

use serde::Serialize;

use rivalscope_core::report::{AnalysisReport, Availability, Swot};
use rivalscope_core::urls::display_label;

/// Series colours, assigned by position and cycled.
pub const PALETTE: [&str; 5] = ["#2563eb", "#0ea5e9", "#22c55e", "#eab308", "#f97316"];

/// Rendered for any value the report does not contain.
pub const PLACEHOLDER: &str = "-";

const NOT_AVAILABLE: &str = "N/A";
const MAX_LISTED_TIER_FEATURES: usize = 4;
const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Feature matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "note", rename_all = "snake_case")]
pub enum FeatureCell {
    Available,
    Unavailable,
    /// Qualified support, e.g. "Enterprise only".
    Partial(String),
    /// The report says nothing about this company.
    Unknown,
}

impl From<Option<&Availability>> for FeatureCell {
    fn from(value: Option<&Availability>) -> Self {
        match value {
            Some(Availability::Flag(true)) => FeatureCell::Available,
            Some(Availability::Flag(false)) => FeatureCell::Unavailable,
            Some(Availability::Note(note)) => FeatureCell::Partial(note.clone()),
            None => FeatureCell::Unknown,
        }
    }
}

impl fmt::Display for FeatureCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureCell::Available => write!(f, "Yes"),
            FeatureCell::Unavailable => write!(f, "No"),
            FeatureCell::Partial(note) => write!(f, "{note}"),
            FeatureCell::Unknown => write!(f, "{PLACEHOLDER}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub name: String,
    pub canonical_feature: String,
    /// Whole percentage, 0-100.
    pub confidence_pct: u8,
    pub evidence_snippet: String,
    /// One cell per URL in scope, primary first.
    pub cells: Vec<FeatureCell>,
}

pub fn confidence_pct(confidence: f64) -> u8 {
    if !confidence.is_finite() {
        return 0;
    }
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn feature_matrix(report: &AnalysisReport) -> Vec<FeatureRow> {
    let urls = report.urls();
    report
        .body
        .features
        .iter()
        .map(|feature| FeatureRow {
            name: feature.name.clone(),
            canonical_feature: feature.canonical_feature.clone(),
            confidence_pct: confidence_pct(feature.confidence),
            evidence_snippet: feature.evidence_snippet.clone(),
            cells: urls
                .iter()
                .map(|url| FeatureCell::from(feature.availability_for(url)))
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDensity {
    pub url: String,
    pub label: String,
    pub count: usize,
}

/// Features marked exactly `true` per URL in scope, primary first.
///
/// Partial support and missing entries do not count.
pub fn feature_density(report: &AnalysisReport) -> Vec<FeatureDensity> {
    report
        .urls()
        .into_iter()
        .map(|url| FeatureDensity {
            url: url.to_string(),
            label: display_label(url),
            count: report
                .body
                .features
                .iter()
                .filter(|f| matches!(f.availability_for(url), Some(Availability::Flag(true))))
                .count(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Strategic positioning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionPoint {
    pub url: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub color: &'static str,
}

/// One point per positioning entry. URLs in scope come first in request
/// order, then any other keys the model returned.
pub fn positioning_series(report: &AnalysisReport) -> Vec<PositionPoint> {
    let positions = &report.body.market_positioning;
    let scoped = report.urls();
    let ordered = scoped
        .iter()
        .copied()
        .filter(|url| positions.contains_key(*url))
        .chain(
            positions
                .keys()
                .map(String::as_str)
                .filter(|key| !scoped.contains(key)),
        );

    let mut points = Vec::with_capacity(positions.len());
    for (index, url) in ordered.enumerate() {
        if let Some(position) = positions.get(url) {
            points.push(PositionPoint {
                url: url.to_string(),
                label: display_label(url),
                x: position.x,
                y: position.y,
                color: PALETTE[index % PALETTE.len()],
            });
        }
    }
    points
}

// ---------------------------------------------------------------------------
// SEO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoMetric {
    PageSpeedScore,
    MobileFriendly,
    BlogFreshness,
    MetaDescriptionHealth,
}

impl SeoMetric {
    pub const ALL: [SeoMetric; 4] = [
        SeoMetric::PageSpeedScore,
        SeoMetric::MobileFriendly,
        SeoMetric::BlogFreshness,
        SeoMetric::MetaDescriptionHealth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SeoMetric::PageSpeedScore => "Page Speed Score",
            SeoMetric::MobileFriendly => "Mobile Friendly",
            SeoMetric::BlogFreshness => "Blog Freshness",
            SeoMetric::MetaDescriptionHealth => "Meta Description",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGrade {
    Good,
    Fair,
    Poor,
}

impl ScoreGrade {
    pub fn from_score(score: f64) -> Self {
        if score > 80.0 {
            ScoreGrade::Good
        } else if score > 50.0 {
            ScoreGrade::Fair
        } else {
            ScoreGrade::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeoCell {
    Score { value: f64, grade: ScoreGrade },
    Flag { value: bool },
    Text { value: String },
    Missing,
}

impl fmt::Display for SeoCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeoCell::Score { value, .. } => write!(f, "{value:.0}/100"),
            SeoCell::Flag { value: true } => write!(f, "Yes"),
            SeoCell::Flag { value: false } => write!(f, "No"),
            SeoCell::Text { value } => write!(f, "{value}"),
            SeoCell::Missing => write!(f, "{PLACEHOLDER}"),
        }
    }
}

/// Look up one SEO metric for `url`.
pub fn seo_cell(report: &AnalysisReport, url: &str, metric: SeoMetric) -> SeoCell {
    let Some(seo) = report.seo_for(url) else {
        return SeoCell::Missing;
    };
    match metric {
        SeoMetric::PageSpeedScore => SeoCell::Score {
            value: seo.page_speed_score,
            grade: ScoreGrade::from_score(seo.page_speed_score),
        },
        SeoMetric::MobileFriendly => match seo.mobile_friendly {
            Some(value) => SeoCell::Flag { value },
            None => SeoCell::Missing,
        },
        SeoMetric::BlogFreshness => SeoCell::Text {
            value: seo.blog_freshness.to_string(),
        },
        SeoMetric::MetaDescriptionHealth => SeoCell::Text {
            value: seo.meta_description_health.to_string(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoRow {
    pub metric: SeoMetric,
    pub label: &'static str,
    pub cells: Vec<SeoCell>,
}

/// Metrics as rows, URLs in scope as columns.
pub fn seo_table(report: &AnalysisReport) -> Vec<SeoRow> {
    let urls = report.urls();
    SeoMetric::ALL
        .into_iter()
        .map(|metric| SeoRow {
            metric,
            label: metric.label(),
            cells: urls.iter().map(|url| seo_cell(report, url, metric)).collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pricing, SWOT, tech stack
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCard {
    pub tier_name: String,
    pub price: String,
    pub billing_cycle: String,
    pub features: Vec<String>,
    /// Features beyond the listed ones.
    pub more_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingCard {
    pub url: String,
    pub label: String,
    pub is_primary: bool,
    /// `None` renders as the placeholder.
    pub has_free_trial: Option<bool>,
    pub currency: String,
    pub tiers: Vec<TierCard>,
    /// No public tiers; pricing is custom quote only.
    pub custom_quote: bool,
}

impl PricingCard {
    pub fn free_trial_label(&self) -> &'static str {
        match self.has_free_trial {
            Some(true) => "Yes",
            Some(false) => "No",
            None => PLACEHOLDER,
        }
    }
}

pub fn pricing_cards(report: &AnalysisReport) -> Vec<PricingCard> {
    report
        .body
        .pricing
        .iter()
        .map(|pricing| PricingCard {
            url: pricing.url.clone(),
            label: display_label(&pricing.url),
            is_primary: report.is_primary(&pricing.url),
            has_free_trial: pricing.has_free_trial,
            currency: pricing.currency.clone(),
            tiers: pricing
                .tiers
                .iter()
                .map(|tier| TierCard {
                    tier_name: tier.tier_name.clone(),
                    price: tier.price.clone(),
                    billing_cycle: tier.billing_cycle.clone(),
                    features: tier
                        .features_included
                        .iter()
                        .take(MAX_LISTED_TIER_FEATURES)
                        .cloned()
                        .collect(),
                    more_features: tier
                        .features_included
                        .len()
                        .saturating_sub(MAX_LISTED_TIER_FEATURES),
                })
                .collect(),
            custom_quote: pricing.tiers.is_empty(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwotCard {
    pub url: String,
    pub label: String,
    pub is_primary: bool,
    pub swot: Swot,
}

/// Cards for URLs in scope that have a SWOT entry, primary first.
pub fn swot_cards(report: &AnalysisReport) -> Vec<SwotCard> {
    report
        .urls()
        .into_iter()
        .filter_map(|url| {
            report.swot_for(url).map(|swot| SwotCard {
                url: url.to_string(),
                label: display_label(url),
                is_primary: report.is_primary(url),
                swot: swot.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechStackRow {
    pub url: String,
    pub label: String,
    pub frontend: String,
    pub backend: String,
    pub analytics: String,
}

fn join_or_na(items: &[String]) -> String {
    if items.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        items.join(", ")
    }
}

pub fn tech_stack_rows(report: &AnalysisReport) -> Vec<TechStackRow> {
    report
        .body
        .tech_stacks
        .iter()
        .map(|stack| TechStackRow {
            url: stack.url.clone(),
            label: display_label(&stack.url),
            frontend: join_or_na(&stack.frontend),
            backend: join_or_na(&stack.backend),
            analytics: join_or_na(&stack.analytics),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Header and sharing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportHeader {
    pub short_id: String,
    /// Generation date, `YYYY-MM-DD` in UTC.
    pub date: String,
    pub primary_label: String,
    pub competitor_labels: Vec<String>,
}

pub fn report_header(report: &AnalysisReport) -> ReportHeader {
    ReportHeader {
        short_id: report.id.chars().take(SHORT_ID_LEN).collect(),
        date: report.timestamp.format("%Y-%m-%d").to_string(),
        primary_label: display_label(&report.primary_url),
        competitor_labels: report.competitors.iter().map(|c| display_label(c)).collect(),
    }
}

/// Plain-text summary for sharing a report.
pub fn share_summary(report: &AnalysisReport) -> String {
    let competitors = report
        .competitors
        .iter()
        .map(|c| display_label(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Competitor Analysis: {} vs {}\nSummary: {}",
        display_label(&report.primary_url),
        competitors,
        report.body.summary
    )
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Everything the renderer shows for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub header: ReportHeader,
    pub urls: Vec<String>,
    pub labels: Vec<String>,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub feature_matrix: Vec<FeatureRow>,
    pub feature_density: Vec<FeatureDensity>,
    pub positioning: Vec<PositionPoint>,
    pub pricing: Vec<PricingCard>,
    pub swot: Vec<SwotCard>,
    pub tech_stack: Vec<TechStackRow>,
    pub seo: Vec<SeoRow>,
    pub share_text: String,
}

impl ReportView {
    pub fn build(report: &AnalysisReport) -> Self {
        let urls: Vec<String> = report.urls().into_iter().map(String::from).collect();
        Self {
            header: report_header(report),
            labels: urls.iter().map(|u| display_label(u)).collect(),
            urls,
            summary: report.body.summary.clone(),
            recommendations: report.body.recommendations.clone(),
            feature_matrix: feature_matrix(report),
            feature_density: feature_density(report),
            positioning: positioning_series(report),
            pricing: pricing_cards(report),
            swot: swot_cards(report),
            tech_stack: tech_stack_rows(report),
            seo: seo_table(report),
            share_text: share_summary(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rivalscope_core::report::{
        Feature, Freshness, MetaHealth, Position, PricingModel, PricingTier, ReportBody,
        SeoSignals, TechStack,
    };
    use std::collections::BTreeMap;

    const A: &str = "https://www.alpha.com";
    const B: &str = "https://beta.io";

    fn feature(name: &str, availability: &[(&str, Availability)]) -> Feature {
        Feature {
            name: name.into(),
            canonical_feature: name.into(),
            confidence: 0.87,
            evidence_snippet: String::new(),
            availability: availability
                .iter()
                .map(|(url, a)| (url.to_string(), a.clone()))
                .collect(),
        }
    }

    fn report() -> AnalysisReport {
        let yes = Availability::Flag(true);
        let no = Availability::Flag(false);
        AnalysisReport {
            id: "0123456789abcdef".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            primary_url: A.into(),
            competitors: vec![B.into()],
            body: ReportBody {
                profiles: vec![],
                features: vec![
                    feature("SSO", &[(A, yes.clone()), (B, no.clone())]),
                    feature("API", &[(A, yes.clone()), (B, Availability::Note("Beta".into()))]),
                    feature("Audit log", &[(A, yes.clone())]),
                    feature("SCIM", &[(A, no.clone()), (B, no.clone())]),
                    feature("Webhooks", &[(A, Availability::Note("Paid".into())), (B, no)]),
                ],
                pricing: vec![PricingModel {
                    url: B.into(),
                    has_free_trial: None,
                    currency: "USD".into(),
                    tiers: vec![PricingTier {
                        tier_name: "Team".into(),
                        price: "$20".into(),
                        billing_cycle: "month".into(),
                        features_included: (1..=6).map(|i| format!("f{i}")).collect(),
                    }],
                }],
                seo: vec![SeoSignals {
                    url: A.into(),
                    page_speed_score: 72.0,
                    meta_description_health: MetaHealth::Good,
                    schema_types: vec![],
                    blog_freshness: Freshness::Medium,
                    mobile_friendly: None,
                }],
                swot: BTreeMap::from([(B.to_string(), Swot::default())]),
                tech_stacks: vec![TechStack {
                    url: A.into(),
                    frontend: vec!["React".into(), "Next.js".into()],
                    backend: vec![],
                    analytics: vec!["GA4".into()],
                }],
                market_positioning: BTreeMap::from([
                    ("other".to_string(), Position { x: 5.0, y: 5.0 }),
                    (B.to_string(), Position { x: 30.0, y: 40.0 }),
                    (A.to_string(), Position { x: 80.0, y: 90.0 }),
                ]),
                summary: "Alpha leads on security.".into(),
                recommendations: vec![],
            },
        }
    }

    #[test]
    fn density_counts_only_true() {
        let density = feature_density(&report());
        let counts: Vec<(&str, usize)> =
            density.iter().map(|d| (d.label.as_str(), d.count)).collect();
        assert_eq!(counts, vec![("alpha.com", 3), ("beta.io", 0)]);
    }

    #[test]
    fn matrix_marks_missing_availability_unknown() {
        let matrix = feature_matrix(&report());
        let audit = &matrix[2];
        assert_eq!(audit.cells, vec![FeatureCell::Available, FeatureCell::Unknown]);
        assert_eq!(audit.cells[1].to_string(), PLACEHOLDER);
        assert_eq!(matrix[1].cells[1], FeatureCell::Partial("Beta".into()));
        assert_eq!(audit.confidence_pct, 87);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(confidence_pct(1.5), 100);
        assert_eq!(confidence_pct(-0.2), 0);
        assert_eq!(confidence_pct(f64::NAN), 0);
    }

    #[test]
    fn positioning_orders_scope_first_and_cycles_colours() {
        let points = positioning_series(&report());
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["alpha.com", "beta.io", "other"]);
        assert_eq!(points[0].color, PALETTE[0]);
        assert_eq!(points[2].color, PALETTE[2]);
        assert_eq!((points[0].x, points[0].y), (80.0, 90.0));
    }

    #[test]
    fn seo_lookup_and_placeholder() {
        let report = report();
        let score = seo_cell(&report, A, SeoMetric::PageSpeedScore);
        assert_eq!(
            score,
            SeoCell::Score { value: 72.0, grade: ScoreGrade::Fair }
        );
        assert_eq!(score.to_string(), "72/100");
        assert_eq!(seo_cell(&report, A, SeoMetric::BlogFreshness).to_string(), "Medium");
        assert_eq!(seo_cell(&report, B, SeoMetric::MobileFriendly), SeoCell::Missing);
        assert_eq!(seo_cell(&report, B, SeoMetric::MobileFriendly).to_string(), "-");
        // entry exists but the flag was never determined
        assert_eq!(seo_cell(&report, A, SeoMetric::MobileFriendly), SeoCell::Missing);
    }

    #[test]
    fn score_grades() {
        assert_eq!(ScoreGrade::from_score(81.0), ScoreGrade::Good);
        assert_eq!(ScoreGrade::from_score(80.0), ScoreGrade::Fair);
        assert_eq!(ScoreGrade::from_score(50.0), ScoreGrade::Poor);
    }

    #[test]
    fn pricing_cards_truncate_features() {
        let cards = pricing_cards(&report());
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert!(!card.is_primary);
        assert!(!card.custom_quote);
        assert_eq!(card.tiers[0].features, vec!["f1", "f2", "f3", "f4"]);
        assert_eq!(card.tiers[0].more_features, 2);
        assert_eq!(card.has_free_trial, None);
        assert_eq!(card.free_trial_label(), PLACEHOLDER);
    }

    #[test]
    fn known_flags_render_yes_or_no() {
        let mut report = report();
        report.body.seo[0].mobile_friendly = Some(false);
        report.body.pricing[0].has_free_trial = Some(true);

        assert_eq!(
            seo_cell(&report, A, SeoMetric::MobileFriendly),
            SeoCell::Flag { value: false }
        );
        assert_eq!(seo_cell(&report, A, SeoMetric::MobileFriendly).to_string(), "No");
        assert_eq!(pricing_cards(&report)[0].free_trial_label(), "Yes");
    }

    #[test]
    fn swot_and_tech_rows() {
        let report = report();
        let swot = swot_cards(&report);
        assert_eq!(swot.len(), 1);
        assert_eq!(swot[0].url, B);

        let rows = tech_stack_rows(&report);
        assert_eq!(rows[0].frontend, "React, Next.js");
        assert_eq!(rows[0].backend, "N/A");
    }

    #[test]
    fn header_and_share_text() {
        let report = report();
        let header = report_header(&report);
        assert_eq!(header.short_id, "01234567");
        assert_eq!(header.date, "2026-03-14");
        assert_eq!(
            share_summary(&report),
            "Competitor Analysis: alpha.com vs beta.io\nSummary: Alpha leads on security."
        );
    }

    #[test]
    fn view_serializes() {
        let view = ReportView::build(&report());
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["labels"][0], "alpha.com");
        assert_eq!(value["seo"][0]["cells"][1]["kind"], "missing");
        assert_eq!(value["feature_matrix"][2]["cells"][1]["kind"], "unknown");
    }
}
