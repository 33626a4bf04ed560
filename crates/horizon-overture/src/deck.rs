//! Validated slide decks.

use std::collections::HashSet;

use serde::Deserialize;

use horizon_overture_core::logging::targets;

use crate::error::{DeckError, Result};
use crate::slide::{Slide, SlideKind};

#[derive(Deserialize)]
struct SlideList {
    slides: Vec<Slide>,
}

/// An ordered, immutable list of slides.
///
/// Slides whose kind is [`SlideKind::Secret`] are not part of the sequence.
/// They are held aside and shown only when revealed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    slides: Vec<Slide>,
    hidden: Vec<Slide>,
}

impl Deck {
    /// Validate `slides` and build a deck.
    ///
    /// Fails on duplicate ids, on audio without a source and on loop windows
    /// that are inverted, empty or not representable as playback positions.
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(slides.len());
        for slide in &slides {
            if !seen.insert(slide.id.clone()) {
                return Err(DeckError::DuplicateId(slide.id.clone()));
            }
            if let Some(audio) = &slide.audio {
                if audio.src.trim().is_empty() {
                    return Err(DeckError::MissingAudioSource(slide.id.clone()));
                }
                audio.to_cue().map_err(|source| DeckError::InvalidLoop {
                    id: slide.id.clone(),
                    source,
                })?;
            }
        }

        let (hidden, slides): (Vec<_>, Vec<_>) =
            slides.into_iter().partition(|slide| slide.kind() == SlideKind::Secret);

        tracing::debug!(
            target: targets::DECK,
            slides = slides.len(),
            hidden = hidden.len(),
            "deck validated"
        );

        Ok(Self { slides, hidden })
    }

    /// Parse and validate a deck payload.
    ///
    /// Accepts `{ "slides": [...] }` and the nested
    /// `{ "storytelling": { "slides": [...] } }` shape.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(nested) = value.get_mut("storytelling") {
            value = nested.take();
        }
        let list = SlideList::deserialize(value)?;
        Self::new(list.slides)
    }

    /// The sequential slides.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Number of sequential slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether there are no sequential slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// The sequential slide at `index`.
    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Slides held aside for reveal.
    pub fn hidden(&self) -> &[Slide] {
        &self.hidden
    }

    /// A hidden slide by tag.
    pub fn find_hidden(&self, tag: &str) -> Option<&Slide> {
        self.hidden.iter().find(|slide| slide.id.is_tag(tag))
    }
}

#[cfg(test)]
mod tests {
    use horizon_overture_multimedia::LoopWindowError;

    use super::*;
    use crate::slide::SlideId;

    const PAYLOAD: &str = r#"{
        "storytelling": {
            "slides": [
                { "id": 1, "title": "Hola", "audio": { "src": "a.mp3", "loop": { "start": 0, "end": 10 } } },
                { "id": 5, "title": "Preguntas", "questions": ["q0", "q1", "q2"] },
                { "id": "secret", "title": "Shh" },
                { "id": "final", "title": "Gracias" }
            ]
        }
    }"#;

    #[test]
    fn test_nested_payload() {
        let deck = Deck::from_json(PAYLOAD).unwrap();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.get(2).unwrap().id, SlideId::from("final"));
        assert_eq!(deck.hidden().len(), 1);
        assert_eq!(deck.find_hidden("secret").unwrap().title, "Shh");
        assert!(deck.find_hidden("final").is_none());
    }

    #[test]
    fn test_flat_payload() {
        let deck = Deck::from_json(r#"{ "slides": [{ "id": 1, "title": "Hola" }] }"#).unwrap();
        assert_eq!(deck.len(), 1);
        assert!(deck.hidden().is_empty());

        let empty = Deck::from_json(r#"{ "slides": [] }"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(Deck::from_json("not json"), Err(DeckError::Malformed(_))));
        assert!(matches!(
            Deck::from_json(r#"{ "slides": {} }"#),
            Err(DeckError::Malformed(_))
        ));
        assert!(matches!(Deck::from_json(r#"{ "pages": [] }"#), Err(DeckError::Malformed(_))));
        assert!(matches!(
            Deck::from_json(r#"{ "slides": [{ "id": 1 }] }"#),
            Err(DeckError::Malformed(_))
        ));
    }

    #[test]
    fn test_duplicate_ids() {
        let result = Deck::new(vec![Slide::numbered(1, "a"), Slide::numbered(1, "b")]);
        assert!(matches!(result, Err(DeckError::DuplicateId(SlideId::Ordinal(1)))));
    }

    #[test]
    fn test_invalid_loop_window() {
        let result = Deck::new(vec![Slide::numbered(2, "a").with_audio("a.mp3", 10.0, 3.0)]);
        assert!(matches!(result, Err(DeckError::InvalidLoop { id: SlideId::Ordinal(2), .. })));

        let result = Deck::new(vec![Slide::numbered(2, "a").with_audio("a.mp3", -1.0, 3.0)]);
        assert!(matches!(result, Err(DeckError::InvalidLoop { .. })));

        let result = Deck::new(vec![Slide::numbered(2, "a").with_audio("a.mp3", 0.0, f64::INFINITY)]);
        assert!(matches!(result, Err(DeckError::InvalidLoop { .. })));
    }

    #[test]
    fn test_loop_bound_too_large_for_playback() {
        let result = Deck::from_json(
            r#"{ "slides": [{ "id": 4, "title": "a", "audio": { "src": "a.mp3", "loop": { "start": 0, "end": 1e20 } } }] }"#,
        );
        assert!(matches!(
            result,
            Err(DeckError::InvalidLoop {
                id: SlideId::Ordinal(4),
                source: LoopWindowError::InvalidBound(_),
            })
        ));
    }

    #[test]
    fn test_missing_audio_source() {
        let result = Deck::new(vec![Slide::numbered(3, "a").with_audio("  ", 0.0, 3.0)]);
        assert!(matches!(result, Err(DeckError::MissingAudioSource(_))));
    }

    #[test]
    fn test_error_messages_name_the_slide() {
        let err = Deck::new(vec![Slide::tagged("final", "a"), Slide::tagged("final", "b")]).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate slide id 'final'");
    }
}
