//! Slide records.
//!
//! A [`Slide`] is one unit of content as it appears in a deck payload. Which
//! optional fields are present decides which sections a renderer draws; the
//! [`SlideKind`] decides which renderer draws it.

use std::fmt;

use serde::{Deserialize, Serialize};

use horizon_overture_multimedia::{AudioCue, LoopWindow, LoopWindowError};

/// A slide identifier: an ordinal (`1`, `2`, ...) or a symbolic tag
/// (`"final"`, `"secret"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlideId {
    /// A numbered slide.
    Ordinal(u64),
    /// A tagged slide.
    Tag(String),
}

impl SlideId {
    /// Whether this id is the tag `tag`.
    pub fn is_tag(&self, tag: &str) -> bool {
        matches!(self, Self::Tag(t) if t == tag)
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinal(n) => write!(f, "{n}"),
            Self::Tag(tag) => write!(f, "'{tag}'"),
        }
    }
}

impl From<u64> for SlideId {
    fn from(n: u64) -> Self {
        Self::Ordinal(n)
    }
}

impl From<&str> for SlideId {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }
}

/// Which renderer draws a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideKind {
    /// Opening slide, and the fallback for unknown ids.
    Welcome,
    /// The reason for the invitation.
    Reason,
    /// Why the recipient was chosen.
    WhyYou,
    /// A list of facts.
    FunFacts,
    /// A carousel of questions.
    Questions,
    /// The call to action.
    CallToAction,
    /// A hidden slide, reachable only by reveal.
    Secret,
    /// The closing slide.
    Final,
}

impl SlideKind {
    /// Pick the renderer for a slide id.
    pub fn from_id(id: &SlideId) -> Self {
        match id {
            SlideId::Ordinal(1) => Self::Welcome,
            SlideId::Ordinal(2) => Self::Reason,
            SlideId::Ordinal(3) => Self::WhyYou,
            SlideId::Ordinal(4) => Self::FunFacts,
            SlideId::Ordinal(5) => Self::Questions,
            SlideId::Ordinal(6) => Self::CallToAction,
            SlideId::Tag(tag) if tag == "secret" => Self::Secret,
            SlideId::Tag(tag) if tag == "final" => Self::Final,
            _ => Self::Welcome,
        }
    }
}

/// Visual weight of a call to action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaVariant {
    Primary,
    Secondary,
}

/// A call-to-action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToAction {
    /// Visual weight.
    #[serde(rename = "type")]
    pub variant: CtaVariant,
    /// Button text.
    pub label: String,
    /// What activating the button targets, such as `#contact` or `#secret`.
    pub action: String,
}

/// Loop bounds in seconds, as written in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopBounds {
    pub start: f64,
    pub end: f64,
}

/// A slide's background audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideAudio {
    /// Source URI.
    pub src: String,
    /// Loop window.
    #[serde(rename = "loop")]
    pub loop_bounds: LoopBounds,
}

impl SlideAudio {
    /// Convert to an engine cue, validating the loop window.
    pub fn to_cue(&self) -> Result<AudioCue, LoopWindowError> {
        let window = LoopWindow::new(self.loop_bounds.start, self.loop_bounds.end)?;
        Ok(AudioCue::new(self.src.clone(), window))
    }
}

/// One unit of presented content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: SlideId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtext: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<CallToAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postscript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<SlideAudio>,
}

impl Slide {
    /// Create a slide with only an id and a title.
    pub fn new(id: SlideId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            styles: Vec::new(),
            quote: None,
            subtext: Vec::new(),
            points: Vec::new(),
            questions: Vec::new(),
            image_placeholder: None,
            description: None,
            cta: None,
            postscript: None,
            audio: None,
        }
    }

    /// Create a numbered slide.
    pub fn numbered(n: u64, title: impl Into<String>) -> Self {
        Self::new(SlideId::Ordinal(n), title)
    }

    /// Create a tagged slide.
    pub fn tagged(tag: &str, title: impl Into<String>) -> Self {
        Self::new(SlideId::from(tag), title)
    }

    /// Attach background audio looping within `[start, end]` seconds.
    pub fn with_audio(mut self, src: impl Into<String>, start: f64, end: f64) -> Self {
        self.audio = Some(SlideAudio {
            src: src.into(),
            loop_bounds: LoopBounds { start, end },
        });
        self
    }

    /// Set the questions carousel.
    pub fn with_questions<I, S>(mut self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.questions = questions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the bullet points.
    pub fn with_points<I, S>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.points = points.into_iter().map(Into::into).collect();
        self
    }

    /// Set the call to action.
    pub fn with_cta(mut self, variant: CtaVariant, label: impl Into<String>, action: impl Into<String>) -> Self {
        self.cta = Some(CallToAction {
            variant,
            label: label.into(),
            action: action.into(),
        });
        self
    }

    /// The renderer for this slide.
    pub fn kind(&self) -> SlideKind {
        SlideKind::from_id(&self.id)
    }

    /// The items a horizontal swipe pages through: the questions, or the
    /// points when there are no questions.
    pub fn sub_items(&self) -> &[String] {
        if self.questions.is_empty() {
            &self.points
        } else {
            &self.questions
        }
    }

    /// The engine cue for this slide's audio.
    ///
    /// `None` for silent slides. Decks validate loop windows when loaded, so
    /// a slide taken from a [`Deck`](crate::deck::Deck) never drops its audio
    /// here.
    pub fn cue(&self) -> Option<AudioCue> {
        self.audio.as_ref().and_then(|audio| audio.to_cue().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_deserializes_number_or_tag() {
        let ids: Vec<SlideId> = serde_json::from_str(r#"[1, "final", 6]"#).unwrap();
        assert_eq!(ids, vec![SlideId::Ordinal(1), SlideId::from("final"), SlideId::Ordinal(6)]);
        assert!(ids[1].is_tag("final"));
        assert_eq!(ids[1].to_string(), "'final'");
    }

    #[test]
    fn test_kind_from_id() {
        assert_eq!(SlideKind::from_id(&SlideId::Ordinal(1)), SlideKind::Welcome);
        assert_eq!(SlideKind::from_id(&SlideId::Ordinal(5)), SlideKind::Questions);
        assert_eq!(SlideKind::from_id(&SlideId::Ordinal(6)), SlideKind::CallToAction);
        assert_eq!(SlideKind::from_id(&"secret".into()), SlideKind::Secret);
        assert_eq!(SlideKind::from_id(&"final".into()), SlideKind::Final);
        assert_eq!(SlideKind::from_id(&SlideId::Ordinal(42)), SlideKind::Welcome);
        assert_eq!(SlideKind::from_id(&"bonus".into()), SlideKind::Welcome);
    }

    #[test]
    fn test_full_slide_payload() {
        let slide: Slide = serde_json::from_str(
            r##"{
                "id": 6,
                "title": "¿Nos vemos?",
                "styles": ["gold"],
                "imagePlaceholder": "couple.jpg",
                "cta": { "type": "primary", "label": "Sí", "action": "#secret" },
                "audio": { "src": "/audio/cta.mp3", "loop": { "start": 12.5, "end": 40 } }
            }"##,
        )
        .unwrap();

        assert_eq!(slide.kind(), SlideKind::CallToAction);
        assert_eq!(slide.image_placeholder.as_deref(), Some("couple.jpg"));
        assert_eq!(slide.cta.as_ref().unwrap().variant, CtaVariant::Primary);
        let cue = slide.cue().unwrap();
        assert_eq!(cue.source, "/audio/cta.mp3");
        assert_eq!(cue.loop_window.start_secs(), 12.5);
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let result: Result<Slide, _> = serde_json::from_str(r#"{ "id": 1 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sub_items_prefer_questions() {
        let slide = Slide::numbered(5, "Preguntas")
            .with_points(["a", "b"])
            .with_questions(["q0", "q1", "q2"]);
        assert_eq!(slide.sub_items().len(), 3);

        let slide = Slide::numbered(4, "Datos").with_points(["a", "b"]);
        assert_eq!(slide.sub_items(), ["a".to_string(), "b".to_string()]);

        assert!(Slide::numbered(1, "Hola").sub_items().is_empty());
    }

    #[test]
    fn test_invalid_loop_has_no_cue() {
        let slide = Slide::numbered(2, "Razón").with_audio("a.mp3", 10.0, 3.0);
        assert!(slide.cue().is_none());
    }
}
