///! Board renderers
///!
///! Serializes the positioned board into an SVG document and the
///! reconciled state into a markdown badge fragment. All colors come
///! from the injected theme; there is no other color table.

use super::github::{PrState, PullRequest};
use super::layout::{Board, Card, SectionLayout, Theme};
use super::mods::{ModRecord, PersistedState};

const FONT_STACK: &str =
    "-apple-system,BlinkMacSystemFont,'Segoe UI',Helvetica,Arial,sans-serif";

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Serializes a [`Board`] into one standalone SVG document
pub struct SvgRenderer {
    theme: Theme,
}

impl SvgRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn render(&self, board: &Board) -> String {
        let mut content = String::new();
        for section in &board.sections {
            content.push_str(&self.render_section(section));
        }

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <rect width="100%" height="100%" fill="{bg}" rx="6"/>
{content}  <text x="{fx}" y="{fy}" font-family="{font}" font-size="9" fill="{muted}" text-anchor="end">{footer}</text>
</svg>
"#,
            w = board.width,
            h = board.height,
            bg = self.theme.background,
            content = content,
            fx = board.width - 16,
            fy = board.height - 8,
            font = FONT_STACK,
            muted = self.theme.text_muted,
            footer = escape_xml(&board.footer),
        )
    }

    fn render_section(&self, section: &SectionLayout) -> String {
        let mut out = format!(
            r#"  <text x="{tx}" y="{ty}" font-family="{font}" font-size="14" font-weight="600" fill="{text}">{title}</text>
  <line x1="{tx}" y1="{ry}" x2="{rx2}" y2="{ry}" stroke="{border}" stroke-width="1"/>
"#,
            tx = section.title_x,
            ty = section.title_y,
            font = FONT_STACK,
            text = self.theme.text,
            title = escape_xml(&section.title),
            ry = section.rule_y,
            rx2 = section.rule_x2,
            border = self.theme.section_border,
        );

        for card in &section.cards {
            out.push_str(&self.render_card(card));
        }

        if let Some(more) = &section.more {
            out.push_str(&format!(
                r#"  <text x="{x}" y="{y}" font-family="{font}" font-size="11" fill="{muted}">{label}</text>
"#,
                x = more.x,
                y = more.y + 11,
                font = FONT_STACK,
                muted = self.theme.text_muted,
                label = escape_xml(&more.label),
            ));
        }

        out
    }

    fn render_card(&self, card: &Card) -> String {
        let mut out = format!(
            r#"  <g>
    <rect x="{x}" y="{y}" width="{w}" height="{h}" rx="6" fill="{bg}" stroke="{border}" stroke-width="1"/>
    <a href="{url}" target="_blank">
      <text x="{nx}" y="{ny}" font-family="{font}" font-size="13" font-weight="600" fill="{link}">{name}</text>
    </a>
    <text x="{nx}" y="{dy}" font-family="{font}" font-size="10" fill="{muted}">{desc}</text>
"#,
            x = card.x,
            y = card.y,
            w = card.width,
            h = card.height,
            bg = self.theme.card_bg,
            border = self.theme.card_border,
            url = escape_xml(&card.url),
            nx = card.x + 10,
            ny = card.y + 24,
            font = FONT_STACK,
            link = self.theme.link,
            name = escape_xml(&card.name),
            dy = card.y + 46,
            muted = self.theme.text_muted,
            desc = escape_xml(&card.description),
        );

        if let Some(chip) = &card.pr_chip {
            let color = match chip.state {
                PrState::Merged => self.theme.link_merged,
                _ => self.theme.link_open,
            };
            out.push_str(&format!(
                r##"    <rect x="{x}" y="{y}" width="{w}" height="{h}" rx="3" fill="{color}"/>
    <text x="{cx}" y="{cy}" font-family="{font}" font-size="9" fill="#ffffff" text-anchor="middle" font-weight="600">{label}</text>
"##,
                x = chip.x,
                y = chip.y,
                w = chip.width,
                h = chip.height,
                color = color,
                cx = chip.x + chip.width / 2,
                cy = chip.y + 11,
                font = FONT_STACK,
                label = escape_xml(&chip.label),
            ));
        }

        for tag in &card.tags {
            out.push_str(&format!(
                r#"    <rect x="{x}" y="{y}" width="{w}" height="{h}" rx="3" fill="{bg}"/>
    <text x="{tx}" y="{ty}" font-family="{font}" font-size="9" fill="{fg}" text-anchor="middle">{label}</text>
"#,
                x = tag.x,
                y = tag.y,
                w = tag.width,
                h = tag.height,
                bg = self.theme.tag_bg,
                tx = tag.x + tag.width / 2,
                ty = tag.y + 11,
                font = FONT_STACK,
                fg = self.theme.tag_text,
                label = escape_xml(&tag.label),
            ));
        }

        out.push_str("  </g>\n");
        out
    }
}

/// Maps reconciled state to a markdown fragment of shields.io badges.
///
/// Presentation filter only, never touching state: released mods appear
/// solely when their latest PR is still open (new work against a shipped
/// mod); in-development mods always appear.
pub struct BadgeRenderer {
    theme: Theme,
    site_base: String,
}

impl BadgeRenderer {
    pub fn new(theme: Theme, site_base: impl Into<String>) -> Self {
        Self {
            theme,
            site_base: site_base.into(),
        }
    }

    /// Shields label segment: percent-encoded with `-` doubled
    fn badge_label(name: &str) -> String {
        urlencoding::encode(name).replace('-', "--")
    }

    fn hex(color: &str) -> &str {
        color.trim_start_matches('#')
    }

    fn mod_badge(&self, mod_record: &ModRecord, status: &str, color: &str) -> String {
        let url = format!("{}/{}", self.site_base, mod_record.curseforge_slug);
        let badge = format!(
            "https://img.shields.io/badge/{}-{}-{}?style=flat-square&logo=curseforge&logoColor=white",
            Self::badge_label(&mod_record.name),
            status,
            Self::hex(color),
        );
        format!("[![{}]({})]({})", mod_record.name, badge, url)
    }

    fn status_badge(&self, pr: &PullRequest) -> String {
        let (label, color) = match pr.status {
            PrState::Merged => ("Merged", self.theme.link_merged),
            _ => ("Open", self.theme.link_open),
        };
        let badge = format!(
            "https://img.shields.io/badge/%23{}-{}-{}?style=flat-square&logo=github&logoColor=white",
            pr.number,
            label,
            Self::hex(color),
        );
        format!("[![#{}]({})]({})", pr.number, badge, pr.url)
    }

    fn latest_pr<'a>(
        state: &'a PersistedState,
        mod_record: &ModRecord,
    ) -> Option<&'a PullRequest> {
        let repo = mod_record.repo.as_deref()?;
        state.latest_pr(repo)
    }

    pub fn render(&self, state: &PersistedState) -> String {
        let mut md = String::from("<div align=\"center\">\n\n");

        for mod_record in &state.mods.active {
            md.push_str(&self.mod_badge(mod_record, "Author", self.theme.link));
            md.push(' ');
        }
        md.push_str("\n\n");

        for mod_record in &state.mods.released {
            // Only shipped mods with unreleased new work get a badge here
            let open_pr =
                Self::latest_pr(state, mod_record).filter(|pr| pr.status == PrState::Open);
            if let Some(pr) = open_pr {
                md.push_str(&self.mod_badge(mod_record, "Released", self.theme.badge_released));
                md.push_str(&self.status_badge(pr));
                md.push(' ');
            }
        }
        md.push_str("\n\n");

        for mod_record in &state.mods.in_development {
            md.push_str(&self.mod_badge(mod_record, "Dev", self.theme.badge_dev));
            if let Some(pr) = Self::latest_pr(state, mod_record) {
                if pr.status != PrState::Closed {
                    md.push_str(&self.status_badge(pr));
                }
            }
            md.push(' ');
        }

        md.push_str("\n\n</div>\n");
        md
    }
}
