use daymark_core::{
    Annotation, AnnotationDraft, AnnotationStore, CalendarDate, DraftError, MemoryAdapter,
    PhotoKind, MAX_UPLOAD_BYTES,
};

#[test]
fn draft_starts_from_existing_record() {
    let existing = Annotation {
        note: Some("Lunch".to_string()),
        links: vec!["https://menu.example".to_string()],
        photos: vec!["https://img.example/plate.jpg".to_string()],
    };

    let draft = AnnotationDraft::from_annotation(Some(&existing));
    assert_eq!(draft.note(), "Lunch");
    assert_eq!(draft.build(), existing);

    let empty = AnnotationDraft::from_annotation(None);
    assert_eq!(empty, AnnotationDraft::new());
    assert_eq!(empty.build(), Annotation::default());
}

#[test]
fn links_are_validated_and_kept_in_order() {
    let mut draft = AnnotationDraft::new();
    draft.add_link("https://one.example").unwrap();
    draft.add_link(" https://two.example/page ").unwrap();

    let err = draft.add_link("two.example").unwrap_err();
    assert_eq!(err, DraftError::InvalidUrl("two.example".to_string()));
    assert_eq!(
        draft.links(),
        ["https://one.example", "https://two.example/page"]
    );

    assert_eq!(draft.remove_link(0).unwrap(), "https://one.example");
    assert_eq!(
        draft.remove_link(5).unwrap_err(),
        DraftError::IndexOutOfRange { index: 5, len: 1 }
    );
}

#[test]
fn uploads_become_embedded_data_uris() {
    let mut draft = AnnotationDraft::new();
    draft.add_photo_url("https://img.example/a.jpg").unwrap();
    draft.add_photo_upload(b"\x89PNG", "image/png").unwrap();

    let annotation = draft.build();
    assert_eq!(annotation.photos[1], "data:image/png;base64,iVBORw==");

    let kinds: Vec<PhotoKind> = annotation.photo_refs().map(|(kind, _)| kind).collect();
    assert_eq!(kinds, vec![PhotoKind::Remote, PhotoKind::Embedded]);
}

#[test]
fn uploads_over_the_cap_or_of_wrong_type_are_rejected() {
    let mut draft = AnnotationDraft::new();

    let oversized = vec![0_u8; MAX_UPLOAD_BYTES + 1];
    assert_eq!(
        draft.add_photo_upload(&oversized, "image/jpeg").unwrap_err(),
        DraftError::UploadTooLarge {
            size: MAX_UPLOAD_BYTES + 1,
            limit: MAX_UPLOAD_BYTES,
        }
    );
    assert_eq!(
        draft.add_photo_upload(b"%PDF", "application/pdf").unwrap_err(),
        DraftError::UnsupportedMediaType("application/pdf".to_string())
    );

    let at_cap = vec![0_u8; MAX_UPLOAD_BYTES];
    draft.add_photo_upload(&at_cap, "image/jpeg").unwrap();
    assert_eq!(draft.photos().len(), 1);
}

#[test]
fn blank_note_builds_as_no_note() {
    let mut draft = AnnotationDraft::new();
    draft.set_note("   ");
    assert_eq!(draft.build().note, None);

    draft.set_note("Dentist 3pm");
    assert_eq!(draft.build().note.as_deref(), Some("Dentist 3pm"));
}

#[test]
fn editing_one_field_through_a_draft_keeps_the_others() {
    let date = CalendarDate::new(2024, 3, 15).unwrap();
    let mut store = AnnotationStore::load(MemoryAdapter::new()).unwrap();
    store
        .set(
            date,
            Annotation {
                note: Some("old".to_string()),
                links: vec!["https://keep.example".to_string()],
                photos: Vec::new(),
            },
        )
        .unwrap();

    let mut draft = AnnotationDraft::from_annotation(store.get(&date));
    draft.set_note("new");
    store.set(date, draft.build()).unwrap();

    let stored = store.get(&date).unwrap();
    assert_eq!(stored.note.as_deref(), Some("new"));
    assert_eq!(stored.links, vec!["https://keep.example".to_string()]);
}
