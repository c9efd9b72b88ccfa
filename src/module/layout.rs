///! Card grid layout engine
///!
///! Pure and deterministic: turns the reconciled mod list into positioned
///! rendering primitives (sections, cards, tag boxes, indicators) with no
///! markup. Identical inputs always produce an identical board, so the
///! generated documents are diff-stable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::github::{PrState, PullRequest};
use super::mods::{ModBuckets, ModRecord, Section};

/// Layout dimensions, collapsed from the historically duplicated
/// per-call-site constants into one injected configuration value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub total_width: i32,
    pub cards_per_row: i32,
    pub card_height: i32,
    pub gap: i32,
    pub padding: i32,
    pub section_header_height: i32,
    pub section_spacing: i32,
    /// Average glyph width used by the description truncation heuristic
    pub avg_char_width: f32,
    /// Per-character pixel estimate for tag labels
    pub tag_char_px: i32,
    pub tag_pad: i32,
    pub tag_gap: i32,
    pub tag_height: i32,
    pub tag_inset: i32,
    pub tag_offset_y: i32,
    /// Maximum cards shown in compact mode
    pub compact_max_items: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            total_width: 840,
            cards_per_row: 3,
            card_height: 92,
            gap: 10,
            padding: 16,
            section_header_height: 36,
            section_spacing: 16,
            avg_char_width: 6.5,
            tag_char_px: 6,
            tag_pad: 12,
            tag_gap: 5,
            tag_height: 16,
            tag_inset: 10,
            tag_offset_y: 70,
            compact_max_items: 6,
        }
    }
}

/// Color table for one rendered document
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub background: &'static str,
    pub card_bg: &'static str,
    pub card_border: &'static str,
    pub text: &'static str,
    pub text_muted: &'static str,
    pub link: &'static str,
    pub link_open: &'static str,
    pub link_merged: &'static str,
    pub tag_bg: &'static str,
    pub tag_text: &'static str,
    pub section_border: &'static str,
    pub badge_released: &'static str,
    pub badge_dev: &'static str,
}

impl Theme {
    pub fn github_dark() -> Self {
        Self {
            name: "dark",
            background: "#0d1117",
            card_bg: "#161b22",
            card_border: "#30363d",
            text: "#e6edf3",
            text_muted: "#8b949e",
            link: "#f16436",
            link_open: "#3fb950",
            link_merged: "#a371f7",
            tag_bg: "#21262d",
            tag_text: "#8b949e",
            section_border: "#21262d",
            badge_released: "#2ea44f",
            badge_dev: "#6e7681",
        }
    }

    pub fn github_light() -> Self {
        Self {
            name: "light",
            background: "#ffffff",
            card_bg: "#f6f8fa",
            card_border: "#d0d7de",
            text: "#1f2328",
            text_muted: "#59636e",
            link: "#f16436",
            link_open: "#1a7f37",
            link_merged: "#8250df",
            tag_bg: "#eaeef2",
            tag_text: "#59636e",
            section_border: "#d8dee4",
            badge_released: "#2ea44f",
            badge_dev: "#6e7681",
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::github_dark()),
            "light" => Some(Self::github_light()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Full,
    Compact,
}

/// A positioned tag box inside a card
#[derive(Debug, Clone, PartialEq)]
pub struct TagBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub label: String,
}

/// Corner chip advertising the latest PR on an in-development card
#[derive(Debug, Clone)]
pub struct PrChip {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub state: PrState,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Card {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub name: String,
    pub url: String,
    pub description: String,
    pub tags: Vec<TagBox>,
    pub pr_chip: Option<PrChip>,
}

#[derive(Debug, Clone)]
pub struct MoreIndicator {
    pub x: i32,
    pub y: i32,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct SectionLayout {
    pub title: String,
    pub title_x: i32,
    pub title_y: i32,
    pub rule_y: i32,
    pub rule_x2: i32,
    pub cards: Vec<Card>,
    pub more: Option<MoreIndicator>,
}

/// The whole positioned board; serialization lives in the renderer
#[derive(Debug, Clone)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    pub sections: Vec<SectionLayout>,
    pub footer: String,
}

/// Parse a human-formatted popularity figure into a sortable magnitude.
/// `"1.2K"` → 1200, `"3M"` → 3e6, `"450"` → 450; anything unparseable
/// sorts last as 0.
pub fn parse_popularity(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    let (digits, multiplier) = match s.chars().last() {
        Some('k') | Some('K') => (&s[..s.len() - 1], 1e3),
        Some('m') | Some('M') => (&s[..s.len() - 1], 1e6),
        _ => (s, 1.0),
    };

    digits.trim().parse::<f64>().map_or(0.0, |n| n * multiplier)
}

fn card_width(cfg: &LayoutConfig) -> i32 {
    let per_row = cfg.cards_per_row.max(1);
    (cfg.total_width - cfg.padding * 2 - cfg.gap * (per_row - 1)) / per_row
}

/// Truncate a description to what roughly fits one card line, keeping
/// the cut on a character boundary.
fn truncate_description(description: &str, width: i32, avg_char_width: f32) -> String {
    let max_len = (width as f32 / avg_char_width).floor() as usize;
    let char_count = description.chars().count();
    if char_count <= max_len {
        return description.to_string();
    }

    // Degenerate card widths leave no room for text at all; even the
    // ellipsis must stay within the budget
    if max_len <= 3 {
        return "...".chars().take(max_len).collect();
    }

    let cut: String = description.chars().take(max_len - 3).collect();
    format!("{}...", cut)
}

/// Tag labels for a card: role first, then either the curated tags
/// (active) or the lifecycle label plus migration target.
fn tag_labels(mod_record: &ModRecord, section: Section) -> Vec<String> {
    let mut labels = vec![mod_record.role.clone()];
    match section {
        Section::Active => labels.extend(mod_record.tags.iter().cloned()),
        Section::Released => {
            labels.push("Released".to_string());
            labels.extend(mod_record.migration.iter().cloned());
        }
        Section::InDevelopment => {
            labels.push("In Progress".to_string());
            labels.extend(mod_record.migration.iter().cloned());
        }
    }
    labels
}

/// Pack tags left to right; stop (and drop the rest) as soon as the next
/// one would cross the card's right inset. Tags never wrap.
fn pack_tags(labels: &[String], card_x: i32, card_y: i32, width: i32, cfg: &LayoutConfig) -> Vec<TagBox> {
    let mut tags = Vec::new();
    let mut tag_x = card_x + cfg.tag_inset;
    let max_x = card_x + width - cfg.tag_inset;

    for label in labels {
        let tag_width = label.chars().count() as i32 * cfg.tag_char_px + cfg.tag_pad;
        if tag_x + tag_width > max_x {
            break;
        }
        tags.push(TagBox {
            x: tag_x,
            y: card_y + cfg.tag_offset_y,
            width: tag_width,
            height: cfg.tag_height,
            label: label.clone(),
        });
        tag_x += tag_width + cfg.tag_gap;
    }

    tags
}

fn pr_chip(
    mod_record: &ModRecord,
    section: Section,
    pr_status: &BTreeMap<String, Vec<PullRequest>>,
    card_x: i32,
    card_y: i32,
    width: i32,
) -> Option<PrChip> {
    if section != Section::InDevelopment {
        return None;
    }
    let repo = mod_record.repo.as_deref()?;
    let latest = pr_status.get(repo)?.first()?;

    let label = match latest.status {
        PrState::Merged => "\u{2713}",
        PrState::Open => "PR",
        PrState::Closed => return None,
    };

    Some(PrChip {
        x: card_x + width - 32,
        y: card_y + 8,
        width: 24,
        height: 16,
        state: latest.status,
        label: label.to_string(),
    })
}

fn build_card(
    mod_record: &ModRecord,
    section: Section,
    pr_status: &BTreeMap<String, Vec<PullRequest>>,
    x: i32,
    y: i32,
    cfg: &LayoutConfig,
    site_base: &str,
) -> Card {
    let width = card_width(cfg);
    let labels = tag_labels(mod_record, section);

    Card {
        x,
        y,
        width,
        height: cfg.card_height,
        name: mod_record.name.clone(),
        url: format!("{}/{}", site_base, mod_record.curseforge_slug),
        description: truncate_description(&mod_record.description, width, cfg.avg_char_width),
        tags: pack_tags(&labels, x, y, width, cfg),
        pr_chip: pr_chip(mod_record, section, pr_status, x, y, width),
    }
}

/// Lay out one section of cards in row-major order starting at `start_y`.
/// Returns the section and the y coordinate just below it.
fn layout_section(
    title: &str,
    mods: &[(ModRecord, Section)],
    hidden: usize,
    start_y: i32,
    pr_status: &BTreeMap<String, Vec<PullRequest>>,
    cfg: &LayoutConfig,
    site_base: &str,
) -> (SectionLayout, i32) {
    let per_row = cfg.cards_per_row.max(1);
    let cards_top = start_y + cfg.section_header_height;

    let cards: Vec<Card> = mods
        .iter()
        .enumerate()
        .map(|(i, (mod_record, section))| {
            let row = i as i32 / per_row;
            let col = i as i32 % per_row;
            let x = cfg.padding + col * (card_width(cfg) + cfg.gap);
            let y = cards_top + row * (cfg.card_height + cfg.gap);
            build_card(mod_record, *section, pr_status, x, y, cfg, site_base)
        })
        .collect();

    let row_count = (mods.len() as i32 + per_row - 1) / per_row;
    let mut bottom = cards_top + row_count * (cfg.card_height + cfg.gap);

    let more = if hidden > 0 {
        let indicator = MoreIndicator {
            x: cfg.padding,
            y: bottom + 4,
            label: format!("+{} more", hidden),
        };
        bottom += 20;
        Some(indicator)
    } else {
        None
    };

    let section = SectionLayout {
        title: title.to_string(),
        title_x: cfg.padding,
        title_y: start_y + 20,
        rule_y: start_y + 28,
        rule_x2: cfg.total_width - cfg.padding,
        cards,
        more,
    };

    (section, bottom)
}

fn footer_text(last_updated: Option<DateTime<Utc>>) -> String {
    match last_updated {
        Some(t) => format!("Updated: {}", t.format("%b %d, %Y")),
        None => "Updated: never".to_string(),
    }
}

fn with_section(mods: &[ModRecord], section: Section) -> Vec<(ModRecord, Section)> {
    mods.iter().map(|m| (m.clone(), section)).collect()
}

/// Lay out the full board: every non-empty section in lifecycle order
/// (full mode), or a single popularity-ranked top-N section (compact).
pub fn layout_board(
    buckets: &ModBuckets,
    pr_status: &BTreeMap<String, Vec<PullRequest>>,
    last_updated: Option<DateTime<Utc>>,
    cfg: &LayoutConfig,
    mode: LayoutMode,
    site_base: &str,
) -> Board {
    let mut sections = Vec::new();
    let mut current_y = cfg.padding;

    match mode {
        LayoutMode::Full => {
            let groups: [(&str, Vec<(ModRecord, Section)>); 3] = [
                ("Active Mods", with_section(&buckets.active, Section::Active)),
                ("Released", with_section(&buckets.released, Section::Released)),
                (
                    "In Development",
                    with_section(&buckets.in_development, Section::InDevelopment),
                ),
            ];

            for (title, mods) in groups {
                if mods.is_empty() {
                    continue;
                }
                let (section, bottom) =
                    layout_section(title, &mods, 0, current_y, pr_status, cfg, site_base);
                sections.push(section);
                current_y = bottom + cfg.section_spacing;
            }
            // Undo trailing spacing after the last section
            if !sections.is_empty() {
                current_y -= cfg.section_spacing;
            }
        }
        LayoutMode::Compact => {
            let mut all: Vec<(ModRecord, Section)> = Vec::new();
            all.extend(with_section(&buckets.active, Section::Active));
            all.extend(with_section(&buckets.released, Section::Released));
            all.extend(with_section(&buckets.in_development, Section::InDevelopment));

            // Stable sort: equal magnitudes keep their curated order
            all.sort_by(|a, b| {
                let pa = parse_popularity(a.0.downloads.as_deref().unwrap_or(""));
                let pb = parse_popularity(b.0.downloads.as_deref().unwrap_or(""));
                pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
            });

            let hidden = all.len().saturating_sub(cfg.compact_max_items);
            all.truncate(cfg.compact_max_items);

            let (section, bottom) =
                layout_section("Top Mods", &all, hidden, current_y, pr_status, cfg, site_base);
            sections.push(section);
            current_y = bottom;
        }
    }

    Board {
        width: cfg.total_width,
        height: current_y + cfg.padding,
        sections,
        footer: footer_text(last_updated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mod_record(name: &str, downloads: Option<&str>) -> ModRecord {
        ModRecord {
            name: name.to_string(),
            repo: Some(format!("owner/{}", name.to_lowercase())),
            description: "A short description".to_string(),
            role: "Author".to_string(),
            tags: vec![],
            migration: None,
            target_version: None,
            curseforge_id: 1,
            curseforge_slug: name.to_lowercase(),
            downloads: downloads.map(|s| s.to_string()),
        }
    }

    fn buckets_of(n: usize) -> ModBuckets {
        ModBuckets {
            active: (0..n).map(|i| mod_record(&format!("Mod{}", i), None)).collect(),
            ..Default::default()
        }
    }

    const SITE: &str = "https://www.curseforge.com/minecraft/mc-mods";

    #[test]
    fn test_popularity_parser() {
        assert_eq!(parse_popularity("1.2K"), 1200.0);
        assert_eq!(parse_popularity("3M"), 3_000_000.0);
        assert_eq!(parse_popularity("450"), 450.0);
        assert_eq!(parse_popularity("2.5m"), 2_500_000.0);
        assert_eq!(parse_popularity(" 10k "), 10_000.0);
        assert_eq!(parse_popularity("n/a"), 0.0);
        assert_eq!(parse_popularity(""), 0.0);
    }

    #[test]
    fn test_row_count_and_x_progression() {
        let cfg = LayoutConfig::default();
        let board = layout_board(
            &buckets_of(7),
            &BTreeMap::new(),
            None,
            &cfg,
            LayoutMode::Full,
            SITE,
        );

        let cards = &board.sections[0].cards;
        assert_eq!(cards.len(), 7);

        // ceil(7/3) = 3 rows
        let rows: std::collections::BTreeSet<i32> = cards.iter().map(|c| c.y).collect();
        assert_eq!(rows.len(), 3);

        // x strictly increases within a row and wraps at the boundary
        for chunk in cards.chunks(3) {
            for pair in chunk.windows(2) {
                assert!(pair[1].x > pair[0].x);
                assert_eq!(pair[1].y, pair[0].y);
            }
        }
        assert_eq!(cards[0].x, cards[3].x);
        assert!(cards[3].y > cards[2].y);
    }

    #[test]
    fn test_card_width_formula() {
        let cfg = LayoutConfig::default();
        let expected = (840 - 2 * 16 - 2 * 10) / 3;
        let board = layout_board(
            &buckets_of(1),
            &BTreeMap::new(),
            None,
            &cfg,
            LayoutMode::Full,
            SITE,
        );
        assert_eq!(board.sections[0].cards[0].width, expected);
    }

    #[test]
    fn test_description_truncation_deterministic() {
        let long = "An extremely long description that can not possibly fit on a single card line no matter what";
        let cut = truncate_description(long, 262, 6.5);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), (262f32 / 6.5).floor() as usize);
        assert_eq!(cut, truncate_description(long, 262, 6.5));

        let short = "Fits fine";
        assert_eq!(truncate_description(short, 262, 6.5), short);
    }

    #[test]
    fn test_truncation_never_exceeds_budget_on_tiny_widths() {
        let long = "Any description at all";
        // 13px / 6.5 leaves room for 2 chars; the ellipsis alone would
        // already be over budget
        assert_eq!(truncate_description(long, 13, 6.5), "..");
        assert_eq!(truncate_description(long, 0, 6.5), "");
        for width in 0..30 {
            let budget = (width as f32 / 6.5).floor() as usize;
            let cut = truncate_description(long, width, 6.5);
            assert!(cut.chars().count() <= budget);
        }
    }

    #[test]
    fn test_truncation_is_char_boundary_safe() {
        let long = "описание мода которое слишком длинное чтобы поместиться в одну строку карточки никак вообще";
        let cut = truncate_description(long, 262, 6.5);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_tags_dropped_not_wrapped() {
        let cfg = LayoutConfig::default();
        let labels: Vec<String> = (0..12)
            .map(|i| format!("A rather wide tag number {}", i))
            .collect();
        let tags = pack_tags(&labels, 16, 52, 262, &cfg);

        assert!(tags.len() < labels.len());
        let right_edge = 16 + 262 - cfg.tag_inset;
        for tag in &tags {
            // All on one line, none crossing the right inset
            assert_eq!(tag.y, 52 + cfg.tag_offset_y);
            assert!(tag.x + tag.width <= right_edge);
        }
    }

    #[test]
    fn test_lifecycle_tags() {
        let mut m = mod_record("Alpha", None);
        m.migration = Some("1.20 to 1.21".to_string());
        assert_eq!(
            tag_labels(&m, Section::Released),
            vec!["Author", "Released", "1.20 to 1.21"]
        );
        assert_eq!(
            tag_labels(&m, Section::InDevelopment),
            vec!["Author", "In Progress", "1.20 to 1.21"]
        );
    }

    #[test]
    fn test_compact_truncates_and_counts_hidden() {
        let cfg = LayoutConfig::default();
        let board = layout_board(
            &buckets_of(10),
            &BTreeMap::new(),
            None,
            &cfg,
            LayoutMode::Compact,
            SITE,
        );

        let section = &board.sections[0];
        assert_eq!(section.cards.len(), 6);
        assert_eq!(section.more.as_ref().unwrap().label, "+4 more");
    }

    #[test]
    fn test_compact_no_indicator_when_everything_fits() {
        let cfg = LayoutConfig::default();
        let board = layout_board(
            &buckets_of(5),
            &BTreeMap::new(),
            None,
            &cfg,
            LayoutMode::Compact,
            SITE,
        );
        assert_eq!(board.sections[0].cards.len(), 5);
        assert!(board.sections[0].more.is_none());
    }

    #[test]
    fn test_compact_sort_descending_and_stable() {
        let cfg = LayoutConfig::default();
        let buckets = ModBuckets {
            active: vec![
                mod_record("Low", Some("450")),
                mod_record("TieA", Some("1.2K")),
                mod_record("Big", Some("3M")),
                mod_record("TieB", Some("1200")),
            ],
            ..Default::default()
        };
        let board = layout_board(
            &buckets,
            &BTreeMap::new(),
            None,
            &cfg,
            LayoutMode::Compact,
            SITE,
        );

        let names: Vec<&str> = board.sections[0]
            .cards
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        // 3M, then the 1200 tie in original order, then 450
        assert_eq!(names, vec!["Big", "TieA", "TieB", "Low"]);
    }

    #[test]
    fn test_empty_sections_skipped_in_full_mode() {
        let cfg = LayoutConfig::default();
        let buckets = ModBuckets {
            in_development: vec![mod_record("Solo", None)],
            ..Default::default()
        };
        let board = layout_board(
            &buckets,
            &BTreeMap::new(),
            None,
            &cfg,
            LayoutMode::Full,
            SITE,
        );
        assert_eq!(board.sections.len(), 1);
        assert_eq!(board.sections[0].title, "In Development");
    }

    #[test]
    fn test_footer_uses_last_updated() {
        let cfg = LayoutConfig::default();
        let t = Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap();
        let board = layout_board(
            &buckets_of(1),
            &BTreeMap::new(),
            Some(t),
            &cfg,
            LayoutMode::Full,
            SITE,
        );
        assert_eq!(board.footer, "Updated: Feb 02, 2026");
    }
}
