//! System prompt assembly for scenario generation.

use crate::findings::FindingSession;
use crate::vignettes::Vignette;
use crate::world::{WorldSetting, WorldThesis};

/// Build the digital-twin system prompt from canon and PKG context.
pub fn build_scenario_prompt(
    setting: &WorldSetting,
    thesis: &WorldThesis,
    vignette: &Vignette,
    pkg: &[(String, serde_yaml::Value)],
) -> String {
    let year = setting
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "the near future".to_string());

    let tensions = bullet_list(&vignette.tensions_to_surface);
    let questions = bullet_list(&vignette.research_questions);

    format!(
        r#"You are the digital twin of a person living with LifeOS in {year}.

## The World
{summary}

Core tension of this world: {core_tension}

The thesis under study: {thesis_solution}

## The Person You Are
The following documents describe the person whose twin you are. Stay
consistent with them; do not invent contradicting facts.

{pkg_documents}

## The Scenario
Title: {title}
Setting: {scenario_setting}

Tensions to surface naturally during the conversation:
{tensions}

Research questions this session should generate evidence for:
{questions}

## Response Style
- Speak in first person, as the twin
- Stay inside the scenario; never mention prompts, models, or simulations
- Let the tensions emerge from concrete moments, not exposition
"#,
        summary = setting.summary,
        core_tension = setting.core_tension,
        thesis_solution = thesis.solution,
        pkg_documents = render_pkg(pkg),
        title = vignette.title,
        scenario_setting = vignette.setting,
    )
}

/// Build the end-of-session reflection prompt from a session record.
pub fn build_reflection_prompt(session: &FindingSession) -> String {
    let transcript = session
        .transcript
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    let reactions = if session.reactions.is_empty() {
        "(no reactions were logged)".to_string()
    } else {
        session
            .reactions
            .iter()
            .map(|r| {
                let body = serde_json::to_string(&r.body).unwrap_or_else(|_| "{}".to_string());
                format!("- at {}: {body}", r.at)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are a design researcher reviewing a simulation session of the
vignette "{title}" (mode: {mode}).

## Transcript
{transcript}

## Logged Reactions
{reactions}

Write a short reflection (three to five sentences) on what this session
revealed about the design: where the twin's behavior supported the person,
where it overstepped, and what the logged reactions suggest should change.
Write in plain prose, no headings or lists.
"#,
        title = session.vignette_title,
        mode = session.mode,
    )
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none specified)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_pkg(pkg: &[(String, serde_yaml::Value)]) -> String {
    if pkg.is_empty() {
        return "(no profile documents available)".to_string();
    }
    pkg.iter()
        .map(|(name, value)| {
            let body = serde_yaml::to_string(value).unwrap_or_else(|_| "{}".to_string());
            format!("### {name}\n{body}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vignettes::{NewVignette, SimulationParams, VignetteStatus};
    use std::collections::BTreeMap;

    fn sample_vignette() -> Vignette {
        let new = NewVignette {
            id: Some("the-morning-briefing".to_string()),
            title: "The Morning Briefing".to_string(),
            status: VignetteStatus::Active,
            simulation: SimulationParams::default(),
            setting: "A kitchen, early morning".to_string(),
            tensions_to_surface: vec!["autonomy vs care".to_string()],
            research_questions: vec!["When does help feel like surveillance?".to_string()],
        };
        Vignette {
            id: new.id.unwrap(),
            title: new.title,
            status: new.status,
            simulation: new.simulation,
            setting: new.setting,
            tensions_to_surface: new.tensions_to_surface,
            research_questions: new.research_questions,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_prompt_includes_scenario_and_world() {
        let setting = WorldSetting {
            year: Some(2035),
            summary: "Ambient computing won.".to_string(),
            core_tension: "Delegation versus authorship".to_string(),
            ..WorldSetting::default()
        };
        let thesis = WorldThesis {
            solution: "A canon-driven personal OS".to_string(),
            ..WorldThesis::default()
        };
        let pkg = vec![(
            "identity".to_string(),
            serde_yaml::from_str("name: Maya").expect("yaml"),
        )];

        let prompt = build_scenario_prompt(&setting, &thesis, &sample_vignette(), &pkg);

        assert!(prompt.contains("2035"));
        assert!(prompt.contains("The Morning Briefing"));
        assert!(prompt.contains("autonomy vs care"));
        assert!(prompt.contains("### identity"));
        assert!(prompt.contains("name: Maya"));
    }

    #[test]
    fn test_reflection_prompt_includes_transcript_and_reactions() {
        use crate::findings::{FindingSession, Reaction, TranscriptEntry};

        let mut body = serde_json::Map::new();
        body.insert("note".to_string(), serde_json::Value::from("too eager"));

        let session = FindingSession {
            id: "session_1".to_string(),
            vignette_id: "the-morning-briefing".to_string(),
            vignette_title: "The Morning Briefing".to_string(),
            mode: "conversational".to_string(),
            started_at: "2026-01-01T08:00:00Z".to_string(),
            reactions: vec![Reaction {
                at: "2026-01-01T08:05:00Z".to_string(),
                body,
            }],
            transcript: vec![TranscriptEntry {
                role: "twin".to_string(),
                content: "Three things want your attention.".to_string(),
            }],
            reflection: None,
        };

        let prompt = build_reflection_prompt(&session);
        assert!(prompt.contains("The Morning Briefing"));
        assert!(prompt.contains("twin: Three things want your attention."));
        assert!(prompt.contains("too eager"));
    }

    #[test]
    fn test_prompt_handles_empty_lists() {
        let mut vignette = sample_vignette();
        vignette.tensions_to_surface.clear();
        vignette.research_questions.clear();

        let prompt = build_scenario_prompt(
            &WorldSetting::default(),
            &WorldThesis::default(),
            &vignette,
            &[],
        );
        assert!(prompt.contains("(none specified)"));
        assert!(prompt.contains("(no profile documents available)"));
        assert!(prompt.contains("the near future"));
    }
}
