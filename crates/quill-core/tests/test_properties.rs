//! Property tests over random edit sequences.

#[cfg(test)]
mod tests {
    use proptest::{collection, prelude::*};
    use quill_core::{
        Editor, EditorConfig, Outcome,
        geom::Expanse,
        key::{Key, ctrl},
        line::LineStore,
    };

    /// One step of a random editing session.
    #[derive(Debug, Clone)]
    enum Step {
        /// Dispatch a key.
        Key(Key),
        /// Resize the terminal.
        Resize(u32, u32),
    }

    fn editor(text: &[u8], size: Expanse) -> Editor {
        Editor::from_bytes(text, "unused.txt", size, EditorConfig::default())
            .expect("failed to build editor")
    }

    fn text_strategy() -> impl Strategy<Value = Vec<u8>> {
        collection::vec(
            prop_oneof![8 => 0x20u8..=0x7e, 1 => Just(b'\n')],
            0..80,
        )
    }

    fn key_strategy() -> impl Strategy<Value = Key> {
        prop_oneof![
            4 => (0x20u8..=0x7e).prop_map(Key::Char),
            1 => Just(Key::Enter),
            2 => Just(Key::Backspace),
            1 => Just(Key::Up),
            1 => Just(Key::Down),
            2 => Just(Key::Left),
            2 => Just(Key::Right),
            1 => Just(Key::Esc),
            1 => Just(Key::from_byte(ctrl('x'))),
        ]
    }

    fn assert_cursor_valid(ed: &Editor) -> Result<(), TestCaseError> {
        let c = ed.cursor();
        let store = ed.store();
        prop_assert!(c.row < store.total_lines());
        prop_assert_eq!(store.nth(c.row), Some(ed.current_id()));
        let len = ed.current_line().map_or(0, |l| l.len());
        prop_assert!(c.col <= len);
        for line in store.iter() {
            prop_assert!(line.len() < line.capacity());
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn inserts_then_backspaces_restore(
            text in text_strategy(),
            moves in 0usize..40,
            typed in collection::vec(0x20u8..=0x7e, 0..40),
        ) {
            let mut ed = editor(&text, Expanse::new(80, 24));
            for _ in 0..moves {
                ed.move_right();
            }
            let before = (ed.text(), ed.cursor());
            for b in &typed {
                ed.insert_char(*b).expect("insert failed");
            }
            for _ in &typed {
                prop_assert!(ed.delete_char().expect("delete failed"));
            }
            prop_assert_eq!((ed.text(), ed.cursor()), before);
        }

        #[test]
        fn split_then_merge_restores(
            line in collection::vec(0x20u8..=0x7e, 0..60),
            col in 0usize..=60,
        ) {
            let mut ed = editor(&line, Expanse::new(80, 24));
            let col = col.min(line.len());
            for _ in 0..col {
                ed.move_right();
            }
            ed.split_line().expect("split failed");
            prop_assert_eq!(ed.store().total_lines(), 2);
            prop_assert!(ed.delete_char().expect("merge failed"));
            prop_assert_eq!(ed.text(), line);
            prop_assert_eq!(ed.cursor().col, col);
        }

        #[test]
        fn cursor_stays_in_bounds(
            text in text_strategy(),
            keys in collection::vec(key_strategy(), 0..200),
        ) {
            let mut ed = editor(&text, Expanse::new(40, 10));
            for key in keys {
                let outcome = ed.handle_key(key).expect("edit failed");
                prop_assert_ne!(outcome, Outcome::Quit);
                assert_cursor_valid(&ed)?;
            }
        }

        #[test]
        fn viewport_tracks_cursor_through_resizes(
            text in text_strategy(),
            steps in collection::vec(
                prop_oneof![
                    3 => key_strategy().prop_map(Step::Key),
                    1 => (0u32..120, 0u32..40).prop_map(|(w, h)| Step::Resize(w, h)),
                ],
                0..100,
            ),
        ) {
            let mut ed = editor(&text, Expanse::new(80, 24));
            for step in steps {
                match step {
                    Step::Key(key) => {
                        ed.handle_key(key).expect("edit failed");
                        ed.reconcile_viewport();
                    }
                    Step::Resize(w, h) => ed.resize(Expanse::new(w, h)),
                }
                assert_cursor_valid(&ed)?;
                prop_assert!(ed.viewport().contains(ed.cursor()));
            }
        }

        #[test]
        fn serialize_reload_round_trips(text in text_strategy()) {
            let store = LineStore::from_bytes(&text).expect("load failed");
            let newlines = text.iter().filter(|b| **b == b'\n').count();
            prop_assert_eq!(store.total_lines(), newlines + 1);
            let bytes = store.to_bytes();
            prop_assert_eq!(&bytes, &text);
            let again = LineStore::from_bytes(&bytes).expect("reload failed");
            prop_assert_eq!(again.total_lines(), store.total_lines());
        }
    }
}
