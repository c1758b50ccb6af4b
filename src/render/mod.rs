//! HTML snapshot rendering with Tera.
//!
//! Rendering is a pure function of the ordered team sections. For each team the
//! template receives the team label and exactly two tiers, `directors` then
//! `officers`; people with any other tier never reach the template.
//!
//! Text is inserted verbatim unless `render.escape_text` is enabled, in which
//! case Tera's HTML autoescaping applies to every interpolated value.

use anyhow::{Context, Result};
use serde::Serialize;
use tera::{Context as TeraContext, Tera};
use tokio::fs;

use crate::config::RenderSettings;
use crate::core::RosterError;
use crate::roster::{ResolvedPerson, TeamSection};

/// Layout used when no template file is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("snapshot.html.tera");

const TEMPLATE_NAME: &str = "snapshot.html";

#[derive(Serialize)]
struct SectionView<'a> {
    team_name: &'a str,
    sort_index: u32,
    tiers: [TierView<'a>; 2],
}

#[derive(Serialize)]
struct TierView<'a> {
    name: &'static str,
    people: Vec<&'a ResolvedPerson>,
}

impl<'a> SectionView<'a> {
    fn new(section: &'a TeamSection) -> Self {
        Self {
            team_name: &section.team_name,
            sort_index: section.sort_index,
            tiers: [
                TierView {
                    name: "directors",
                    people: section.directors().collect(),
                },
                TierView {
                    name: "officers",
                    people: section.officers().collect(),
                },
            ],
        }
    }
}

/// Renders team sections into the snapshot document.
pub struct SnapshotRenderer {
    tera: Tera,
}

impl SnapshotRenderer {
    /// Compile `template`.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::RenderFailed`] if the template does not parse.
    pub fn new(template: &str, escape_text: bool) -> Result<Self, RosterError> {
        let mut tera = Tera::default();
        if escape_text {
            tera.autoescape_on(vec![TEMPLATE_NAME]);
        } else {
            tera.autoescape_on(vec![]);
        }
        tera.add_raw_template(TEMPLATE_NAME, template).map_err(|e| RosterError::RenderFailed {
            reason: format_tera_error(&e),
        })?;
        Ok(Self { tera })
    }

    /// Build a renderer from settings, reading the template file if one is configured.
    pub async fn from_settings(settings: &RenderSettings) -> Result<Self> {
        let renderer = match &settings.template {
            Some(path) => {
                let template = fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read template {}", path.display()))?;
                Self::new(&template, settings.escape_text)
                    .with_context(|| format!("Invalid template {}", path.display()))?
            }
            None => Self::new(DEFAULT_TEMPLATE, settings.escape_text)?,
        };
        Ok(renderer)
    }

    /// Render `sections` in the given order.
    pub fn render(&self, sections: &[TeamSection]) -> Result<String, RosterError> {
        let views: Vec<SectionView<'_>> = sections.iter().map(SectionView::new).collect();
        let mut context = TeraContext::new();
        context.insert("sections", &views);

        self.tera.render(TEMPLATE_NAME, &context).map_err(|e| RosterError::RenderFailed {
            reason: format_tera_error(&e),
        })
    }
}

/// Flatten a Tera error and its sources into one line.
fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }
    messages.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RoleTier;

    fn person(name: &str, title: &str, tier: RoleTier) -> ResolvedPerson {
        ResolvedPerson {
            name: name.into(),
            title: title.into(),
            image_url: format!("https://cdn.example/{name}.jpg"),
            role_tier: tier,
        }
    }

    fn renderer() -> SnapshotRenderer {
        SnapshotRenderer::new(DEFAULT_TEMPLATE, false).unwrap()
    }

    fn sections() -> Vec<TeamSection> {
        vec![
            TeamSection {
                team_name: "Executive".into(),
                sort_index: 1,
                people: vec![
                    person("Olive", "Treasurer", RoleTier::Officer),
                    person("Dina", "President", RoleTier::Director),
                    person("Chad", "Chair", RoleTier::Other("chair".into())),
                ],
            },
            TeamSection {
                team_name: "Events".into(),
                sort_index: 2,
                people: vec![person("Evan", "Organiser", RoleTier::Officer)],
            },
        ]
    }

    #[test]
    fn test_renders_teams_and_tiers_in_order() {
        let html = renderer().render(&sections()).unwrap();

        let executive = html.find("Executive").unwrap();
        let events = html.find("Events").unwrap();
        assert!(executive < events);

        let directors = html.find("tier directors").unwrap();
        let dina = html.find("Dina").unwrap();
        let officers = html.find("tier officers").unwrap();
        let olive = html.find("Olive").unwrap();
        assert!(directors < dina && dina < officers && officers < olive);

        assert!(html.contains(r#"src="https://cdn.example/Olive.jpg""#));
        assert!(html.contains("Treasurer"));
    }

    #[test]
    fn test_unrecognized_tiers_are_not_rendered() {
        let html = renderer().render(&sections()).unwrap();
        assert!(!html.contains("Chad"));
        assert!(!html.contains("Chair"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = renderer();
        assert_eq!(renderer.render(&sections()).unwrap(), renderer.render(&sections()).unwrap());
    }

    #[test]
    fn test_text_is_verbatim_unless_escaping_enabled() {
        let sections = vec![TeamSection {
            team_name: "R&D".into(),
            sort_index: 1,
            people: vec![person("<b>Bo</b>", "Lead", RoleTier::Director)],
        }];

        let raw = SnapshotRenderer::new(DEFAULT_TEMPLATE, false).unwrap().render(&sections).unwrap();
        assert!(raw.contains("<b>Bo</b>"));
        assert!(raw.contains("R&D"));

        let escaped = SnapshotRenderer::new(DEFAULT_TEMPLATE, true).unwrap().render(&sections).unwrap();
        assert!(!escaped.contains("<b>Bo</b>"));
        assert!(escaped.contains("&lt;b&gt;Bo&lt;&#x2F;b&gt;"));
        assert!(escaped.contains("R&amp;D"));
    }

    #[test]
    fn test_custom_template() {
        let renderer = SnapshotRenderer::new(
            "{% for s in sections %}{{ s.team_name }}:{{ s.tiers.1.people | length }};{% endfor %}",
            false,
        )
        .unwrap();
        assert_eq!(renderer.render(&sections()).unwrap(), "Executive:1;Events:1;");
    }

    #[test]
    fn test_invalid_template_is_render_failure() {
        let err = SnapshotRenderer::new("{% for %}", false).err().unwrap();
        assert!(matches!(err, RosterError::RenderFailed { .. }));
    }

    #[test]
    fn test_empty_roster_renders_container_only() {
        let html = renderer().render(&[]).unwrap();
        assert!(html.starts_with("<div class=\"committee\">"));
        assert!(!html.contains("<section"));
    }
}
