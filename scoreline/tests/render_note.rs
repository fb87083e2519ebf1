use scoreline::{
    primitives::{
        Accidental, BaseValue, Duration, Dynamics, EventInfo, EventType, Note,
        NoteName, Pitch, TimeSignature,
    },
    text_render::RendersToText,
};

#[test]
fn test() {
    assert_eq!(
        Note::new(Pitch::from_midi(60), Duration::plain(BaseValue::Quarter))
            .render_text(),
        "C4/4"
    );
    assert_eq!(
        Note::new(Pitch::from_midi(60 - 36), Duration::plain(BaseValue::Whole))
            .render_text(),
        "C1/1"
    );
    assert_eq!(
        Note::new(Pitch::from_midi(61), Duration::dotted(BaseValue::Eighth, 2))
            .render_text(),
        "C#4/8.."
    );
    assert_eq!(
        Note::new(Pitch::from_midi(0), Duration::Uncertain).render_text(),
        "C-1/?"
    );

    let mut note = Note::new(
        Pitch::new(NoteName::E, Accidental::Flat, 5),
        Duration::plain(BaseValue::DoubleWhole),
    );
    note.set_tie(true).set_dynamic(Some(Dynamics::F));
    assert_eq!(note.render_text(), "Eb5/0.5~");
    assert_eq!(
        EventInfo::new(EventType::Note(note))
            .with_time_signature(TimeSignature::new(5, 8).expect("valid meter"))
            .render_text(),
        "[5/8] dyn(f) Eb5/0.5~"
    );
}
