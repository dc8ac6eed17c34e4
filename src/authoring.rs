//! The authoring surface: routes variable insertions and case transforms to
//! whichever input currently has focus.
//!
//! Three kinds of input can receive an insertion: the document body, a
//! signature field, or a condition editor. An open condition editor claims
//! priority over the other two until the user focuses the document or a
//! signature, or closes the editor.

mod blocks;
mod buffer;
mod case;
mod condition;
mod debounce;
mod focus;

use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

pub use blocks::{BlockPalette, find_block, set_condition, unwrap_block, wrap_range};
pub use buffer::{DocumentBody, TextBuffer};
pub use case::CaseMode;
pub use condition::ConditionEditor;
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
pub use focus::{ConditionHandle, Focus, FocusRegistry, SignatureField};

use crate::config::EditorConfig;
use crate::document::{Translator, markers};
use crate::template::{Signature, Template};
use crate::util::byte_offset;

// =============================================================================
// Events
// =============================================================================

/// Notifications broadcast to subscribers of a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The insertion target changed.
    FocusChanged(Focus),
    /// A condition editor lost its place to another one and was closed.
    ConditionEditorDeactivated {
        handle: ConditionHandle,
        block_id: String,
        condition: String,
    },
    VariableInserted { target: Focus, tag: String },
    BlockCreated { block_id: String },
    BlockRemoved { block_id: String },
}

// =============================================================================
// AuthoringSurface
// =============================================================================

pub struct AuthoringSurface<B: DocumentBody> {
    body: B,
    signatures: Vec<Signature>,
    focus: FocusRegistry,
    editors: Vec<ConditionEditor>,
    next_handle: u64,
    /// Selection inside the focused signature field, in chars.
    signature_selection: Option<Range<usize>>,
    debouncer: Debouncer,
    clock: Box<dyn Clock>,
    palette: BlockPalette,
    subscribers: Vec<Sender<SurfaceEvent>>,
}

impl AuthoringSurface<TextBuffer> {
    /// A surface over a template's content and signatures.
    pub fn from_template(
        template: &Template,
        translator: &Translator,
        config: &EditorConfig,
    ) -> Self {
        let body = TextBuffer::from_html(&template.content_html(), translator);
        Self::new(body, template.signatures.clone(), config)
    }
}

impl<B: DocumentBody> AuthoringSurface<B> {
    pub fn new(body: B, signatures: Vec<Signature>, config: &EditorConfig) -> Self {
        Self::with_clock(body, signatures, config, Box::new(SystemClock))
    }

    pub fn with_clock(
        body: B,
        signatures: Vec<Signature>,
        config: &EditorConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            body,
            signatures,
            focus: FocusRegistry::new(),
            editors: Vec::new(),
            next_handle: 1,
            signature_selection: None,
            debouncer: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            clock,
            palette: BlockPalette::from_config(config),
            subscribers: Vec::new(),
        }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<SurfaceEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: SurfaceEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn focus(&self) -> Focus {
        self.focus.current()
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn condition_editor(&self, handle: ConditionHandle) -> Option<&ConditionEditor> {
        self.editors.iter().find(|e| e.handle == handle)
    }

    pub fn open_condition_editors(&self) -> impl Iterator<Item = &ConditionEditor> {
        self.editors.iter()
    }

    /// Editor HTML for the body as it currently stands.
    pub fn editor_html(&self, translator: &Translator) -> String {
        translator.to_editor_html(self.body.document())
    }

    /// Write the edited signatures back into `template`.
    pub fn apply_signatures(&self, template: &mut Template) {
        template.signatures = self.signatures.clone();
    }

    pub fn into_parts(self) -> (B, Vec<Signature>) {
        (self.body, self.signatures)
    }

    // -------------------------------------------------------------------------
    // Focus
    // -------------------------------------------------------------------------

    fn set_target(&mut self, target: Focus) {
        let before = self.focus.current();
        if let Some(released) = self.focus.focus_target(target) {
            tracing::debug!(%released, "released condition editor claim");
        }
        self.signature_selection = None;
        let after = self.focus.current();
        if before != after {
            self.emit(SurfaceEvent::FocusChanged(after));
        }
    }

    /// The user focused the document body.
    pub fn focus_document(&mut self) {
        self.set_target(Focus::Document);
    }

    /// The user focused a signature field. Unknown signatures are ignored.
    pub fn focus_signature(&mut self, index: usize, field: SignatureField) -> bool {
        if index >= self.signatures.len() {
            tracing::debug!(index, "ignoring focus on unknown signature");
            return false;
        }
        self.set_target(Focus::SignatureField { index, field });
        true
    }

    /// Focus the document body and select `range` in it.
    pub fn select_in_document(&mut self, range: Range<usize>) -> bool {
        self.focus_document();
        self.body.select(range)
    }

    /// Focus a signature field and select `range` (chars) in it.
    pub fn select_in_signature(
        &mut self,
        index: usize,
        field: SignatureField,
        range: Range<usize>,
    ) -> bool {
        if !self.focus_signature(index, field) {
            return false;
        }
        let len = field_text(&self.signatures[index], field).chars().count();
        if range.start > range.end || range.end > len {
            tracing::debug!(?range, len, "ignoring out-of-range signature selection");
            return false;
        }
        self.signature_selection = Some(range);
        true
    }

    // -------------------------------------------------------------------------
    // Condition editors
    // -------------------------------------------------------------------------

    /// Open the condition editor of block `block_id` and give it priority.
    ///
    /// Any other open editor is closed, committing its text, and announced
    /// with [`SurfaceEvent::ConditionEditorDeactivated`].
    pub fn open_condition_editor(&mut self, block_id: &str) -> Option<ConditionHandle> {
        let Some(block) = find_block(&self.body.document().nodes, block_id) else {
            tracing::debug!(block_id, "no conditional block to edit");
            return None;
        };
        let condition = block.condition.clone();

        let existing = self
            .editors
            .iter()
            .find(|e| e.block_id == block_id)
            .map(|e| e.handle);
        let handle = match existing {
            Some(handle) => handle,
            None => {
                let handle = ConditionHandle(self.next_handle);
                self.next_handle += 1;
                self.editors
                    .push(ConditionEditor::new(handle, block_id, condition));
                handle
            }
        };

        let others: Vec<ConditionHandle> = self
            .editors
            .iter()
            .map(|e| e.handle)
            .filter(|h| *h != handle)
            .collect();
        for other in others {
            self.deactivate(other);
        }

        self.claim(handle);
        Some(handle)
    }

    /// Give an open editor priority again after it was released.
    pub fn focus_condition_editor(&mut self, handle: ConditionHandle) -> bool {
        if self.condition_editor(handle).is_none() {
            return false;
        }
        self.claim(handle);
        true
    }

    fn claim(&mut self, handle: ConditionHandle) {
        let before = self.focus.current();
        self.focus.claim(handle);
        let after = self.focus.current();
        if before != after {
            self.emit(SurfaceEvent::FocusChanged(after));
        }
    }

    /// Remove an editor, writing its text back as the block's condition.
    fn take_editor(&mut self, handle: ConditionHandle) -> Option<ConditionEditor> {
        let pos = self.editors.iter().position(|e| e.handle == handle)?;
        let editor = self.editors.remove(pos);

        if !set_condition(&mut self.body.document_mut().nodes, &editor.block_id, &editor.text) {
            tracing::debug!(
                block_id = %editor.block_id,
                "kept previous condition: editor text was blank or the block is gone"
            );
        }
        self.focus.release(handle);
        Some(editor)
    }

    fn deactivate(&mut self, handle: ConditionHandle) {
        if let Some(editor) = self.take_editor(handle) {
            self.emit(SurfaceEvent::ConditionEditorDeactivated {
                handle,
                block_id: editor.block_id,
                condition: editor.text,
            });
        }
    }

    /// Close an editor, committing its condition. Focus returns to the last
    /// document or signature target.
    pub fn close_condition_editor(&mut self, handle: ConditionHandle) -> bool {
        let before = self.focus.current();
        if self.take_editor(handle).is_none() {
            return false;
        }
        let after = self.focus.current();
        if before != after {
            self.emit(SurfaceEvent::FocusChanged(after));
        }
        true
    }

    /// The user typed into a condition editor.
    pub fn set_condition_text(&mut self, handle: ConditionHandle, text: &str) -> bool {
        match self.editors.iter_mut().find(|e| e.handle == handle) {
            Some(editor) => {
                editor.set_text(text);
                true
            }
            None => false,
        }
    }

    /// The user moved the cursor or selection in a condition editor.
    pub fn set_condition_selection(
        &mut self,
        handle: ConditionHandle,
        range: Range<usize>,
    ) -> bool {
        self.editors
            .iter_mut()
            .find(|e| e.handle == handle)
            .is_some_and(|editor| editor.select(range))
    }

    // -------------------------------------------------------------------------
    // Conditional blocks
    // -------------------------------------------------------------------------

    /// Wrap the top-level blocks touched by the document selection in a new
    /// conditional block. Returns the new block's id.
    pub fn wrap_selection_in_conditional(&mut self, condition: &str) -> Option<String> {
        if condition.trim().is_empty() {
            tracing::debug!("refusing to create a conditional block without a condition");
            return None;
        }
        let range = self.body.selected_blocks()?;
        let color = self.palette.next_color();
        let block_id = wrap_range(&mut self.body.document_mut().nodes, range, condition, &color)?;

        self.emit(SurfaceEvent::BlockCreated {
            block_id: block_id.clone(),
        });
        Some(block_id)
    }

    /// Remove a conditional block, keeping its content. An editor open on the
    /// block is discarded without committing.
    pub fn unwrap_conditional(&mut self, block_id: &str) -> bool {
        let before = self.focus.current();
        let handles: Vec<ConditionHandle> = self
            .editors
            .iter()
            .filter(|e| e.block_id == block_id)
            .map(|e| e.handle)
            .collect();
        for handle in handles {
            self.editors.retain(|e| e.handle != handle);
            self.focus.release(handle);
        }

        let removed = unwrap_block(&mut self.body.document_mut().nodes, block_id);
        if removed {
            self.emit(SurfaceEvent::BlockRemoved {
                block_id: block_id.to_string(),
            });
        }
        let after = self.focus.current();
        if before != after {
            self.emit(SurfaceEvent::FocusChanged(after));
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Insertion and case
    // -------------------------------------------------------------------------

    /// Insert a variable tag into the focused input.
    ///
    /// Requests within the debounce window of the last accepted insertion,
    /// empty tags, and targets that no longer exist are ignored.
    pub fn insert_variable(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            tracing::debug!("ignoring empty variable tag");
            return false;
        }
        let now = self.clock.now();
        if !self.debouncer.is_ready(now) {
            tracing::debug!(tag, "dropped insertion inside debounce window");
            return false;
        }

        let target = self.focus.current();
        let inserted = match target {
            Focus::ConditionInput { handle } => {
                let name = markers::bare_variable(tag);
                match self.editors.iter_mut().find(|e| e.handle == handle) {
                    Some(editor) if !name.is_empty() => {
                        editor.insert(&name);
                        true
                    }
                    _ => false,
                }
            }
            Focus::SignatureField { index, field } => match self.signatures.get_mut(index) {
                Some(signature) => {
                    append_spaced(field_text_mut(signature, field), tag);
                    self.signature_selection = None;
                    true
                }
                None => false,
            },
            Focus::Document => {
                let inserted = self.body.insert_text(tag);
                self.body.focus();
                inserted
            }
        };

        if !inserted {
            tracing::debug!(tag, ?target, "insertion target unavailable");
            return false;
        }
        self.debouncer.accept(now);
        self.emit(SurfaceEvent::VariableInserted {
            target,
            tag: tag.to_string(),
        });
        true
    }

    /// Change the case of the focused input's selection.
    pub fn apply_case(&mut self, mode: CaseMode) -> bool {
        let applied = match self.focus.current() {
            Focus::ConditionInput { handle } => self
                .editors
                .iter_mut()
                .find(|e| e.handle == handle)
                .is_some_and(|editor| editor.transform_selection(|s| mode.apply(s))),
            Focus::SignatureField { index, field } => {
                match (self.signatures.get_mut(index), self.signature_selection.clone()) {
                    (Some(signature), Some(range)) if !range.is_empty() => {
                        let text = field_text_mut(signature, field);
                        let start = byte_offset(text, range.start);
                        let end = byte_offset(text, range.end);
                        let replacement = mode.apply(&text[start..end]);
                        text.replace_range(start..end, &replacement);
                        self.signature_selection =
                            Some(range.start..range.start + replacement.chars().count());
                        true
                    }
                    _ => false,
                }
            }
            Focus::Document => self.body.transform_selection(&|s: &str| mode.apply(s)),
        };

        if !applied {
            tracing::debug!(?mode, "no selection to transform");
        }
        applied
    }
}

fn field_text(signature: &Signature, field: SignatureField) -> &str {
    match field {
        SignatureField::Title => &signature.title,
        SignatureField::Text => &signature.text,
    }
}

fn field_text_mut(signature: &mut Signature, field: SignatureField) -> &mut String {
    match field {
        SignatureField::Title => &mut signature.title,
        SignatureField::Text => &mut signature.text,
    }
}

/// Append `tag`, separated by one space unless `text` is empty or already
/// ends in whitespace.
fn append_spaced(text: &mut String, tag: &str) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }
    text.push_str(tag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Node};
    use pretty_assertions::assert_eq;

    fn surface(
        doc: Document,
        signatures: Vec<Signature>,
    ) -> (AuthoringSurface<TextBuffer>, ManualClock) {
        let clock = ManualClock::new();
        let surface = AuthoringSurface::with_clock(
            TextBuffer::new(doc),
            signatures,
            &EditorConfig::default(),
            Box::new(clock.clone()),
        );
        (surface, clock)
    }

    fn with_block() -> (Document, String) {
        let block = crate::document::ConditionalBlock::new(
            "EDAD > 18",
            vec![Node::paragraph("mayor de edad")],
        );
        let id = block.id.clone();
        (
            Document::new(vec![Node::paragraph("Contrato"), Node::Conditional(block)]),
            id,
        )
    }

    fn sigs() -> Vec<Signature> {
        vec![
            Signature::new("Empleador", "Hola"),
            Signature::new("Trabajador", ""),
        ]
    }

    #[test]
    fn test_signature_spacing() {
        let (mut surface, clock) = surface(Document::default(), sigs());

        surface.focus_signature(0, SignatureField::Text);
        assert!(surface.insert_variable("{{RUT}}"));
        assert_eq!(surface.signatures()[0].text, "Hola {{RUT}}");

        clock.advance(Duration::from_millis(300));
        surface.focus_signature(1, SignatureField::Text);
        assert!(surface.insert_variable("{{RUT}}"));
        assert_eq!(surface.signatures()[1].text, "{{RUT}}");
    }

    #[test]
    fn test_signature_no_double_space() {
        let (mut surface, _clock) =
            surface(Document::default(), vec![Signature::new("Firma", "Sr. ")]);
        surface.focus_signature(0, SignatureField::Text);
        surface.insert_variable("{{NOMBRE}}");
        assert_eq!(surface.signatures()[0].text, "Sr. {{NOMBRE}}");
    }

    #[test]
    fn test_debounce() {
        let (mut surface, clock) = surface(Document::default(), vec![Signature::new("", "")]);
        surface.focus_signature(0, SignatureField::Title);

        assert!(surface.insert_variable("{{A}}"));
        clock.advance(Duration::from_millis(50));
        assert!(!surface.insert_variable("{{B}}"));
        assert_eq!(surface.signatures()[0].title, "{{A}}");

        clock.advance(Duration::from_millis(200));
        assert!(surface.insert_variable("{{B}}"));
        assert_eq!(surface.signatures()[0].title, "{{A}} {{B}}");
    }

    #[test]
    fn test_debounce_same_tag() {
        let (mut surface, clock) = surface(Document::default(), vec![Signature::new("", "")]);
        surface.focus_signature(0, SignatureField::Text);

        assert!(surface.insert_variable("{{FECHA}}"));
        clock.advance(Duration::from_millis(50));
        assert!(!surface.insert_variable("{{FECHA}}"));
        assert_eq!(surface.signatures()[0].text, "{{FECHA}}");

        clock.advance(Duration::from_millis(200));
        assert!(surface.insert_variable("{{FECHA}}"));
        clock.advance(Duration::from_millis(250));
        assert!(surface.insert_variable("{{FECHA}}"));
        assert_eq!(surface.signatures()[0].text, "{{FECHA}} {{FECHA}} {{FECHA}}");
    }

    #[test]
    fn test_insert_into_document_restores_focus() {
        let (mut surface, _clock) = surface(
            Document::new(vec![Node::paragraph("Señor , presente")]),
            Vec::new(),
        );
        assert!(surface.select_in_document(6..6));
        assert!(surface.insert_variable("{{NOMBRE_TRABAJADOR}}"));

        assert_eq!(
            surface.body().document().text_content(),
            "Señor {{NOMBRE_TRABAJADOR}}, presente"
        );
        assert!(surface.body().is_focused());
    }

    #[test]
    fn test_condition_editor_has_priority() {
        let (doc, block_id) = with_block();
        let (mut surface, clock) = surface(doc, sigs());

        surface.focus_signature(0, SignatureField::Text);
        let handle = surface.open_condition_editor(&block_id).unwrap();
        assert_eq!(surface.focus(), Focus::ConditionInput { handle });

        surface.set_condition_text(handle, "EDAD > 18 && ");
        assert!(surface.insert_variable(" <span>{{ TIENE_HIJOS }}</span> "));
        assert_eq!(
            surface.condition_editor(handle).unwrap().text,
            "EDAD > 18 && TIENE_HIJOS"
        );
        assert_eq!(surface.signatures()[0].text, "Hola");

        // Closing returns focus to the signature and commits the condition
        clock.advance(Duration::from_millis(250));
        assert!(surface.close_condition_editor(handle));
        assert_eq!(
            surface.focus(),
            Focus::SignatureField {
                index: 0,
                field: SignatureField::Text
            }
        );
        let block = find_block(&surface.body().document().nodes, &block_id).unwrap();
        assert_eq!(block.condition, "EDAD > 18 && TIENE_HIJOS");
    }

    #[test]
    fn test_clicking_elsewhere_releases_claim_for_good() {
        let (doc, block_id) = with_block();
        let (mut surface, clock) = surface(doc, sigs());

        let handle = surface.open_condition_editor(&block_id).unwrap();
        surface.focus_document();
        assert_eq!(surface.focus(), Focus::Document);

        // Still open, but insertions go to the document now
        assert!(surface.condition_editor(handle).is_some());
        assert!(surface.insert_variable("{{X}}"));
        assert_eq!(surface.condition_editor(handle).unwrap().text, "EDAD > 18");

        clock.advance(Duration::from_millis(250));
        assert!(surface.insert_variable("{{Y}}"));
        assert_eq!(surface.focus(), Focus::Document);

        assert!(surface.focus_condition_editor(handle));
        assert_eq!(surface.focus(), Focus::ConditionInput { handle });
    }

    #[test]
    fn test_second_editor_deactivates_first() {
        let inner = crate::document::ConditionalBlock::new("B", vec![Node::paragraph("b")]);
        let (doc, first_id) = with_block();
        let second_id = inner.id.clone();
        let mut nodes = doc.nodes;
        nodes.push(Node::Conditional(inner));

        let (mut surface, _clock) = surface(Document::new(nodes), Vec::new());
        let events = surface.subscribe();

        let first = surface.open_condition_editor(&first_id).unwrap();
        surface.set_condition_text(first, "EDAD >= 21");
        let second = surface.open_condition_editor(&second_id).unwrap();

        assert_ne!(first, second);
        assert_eq!(surface.open_condition_editors().count(), 1);
        assert_eq!(surface.focus(), Focus::ConditionInput { handle: second });

        let events: Vec<_> = events.try_iter().collect();
        assert!(events.contains(&SurfaceEvent::ConditionEditorDeactivated {
            handle: first,
            block_id: first_id.clone(),
            condition: "EDAD >= 21".to_string(),
        }));
        assert_eq!(
            find_block(&surface.body().document().nodes, &first_id)
                .unwrap()
                .condition,
            "EDAD >= 21"
        );
    }

    #[test]
    fn test_events_reach_every_subscriber() {
        let (mut surface, _clock) = surface(Document::default(), sigs());
        let a = surface.subscribe();
        let b = surface.subscribe();
        drop(surface.subscribe());

        surface.focus_signature(1, SignatureField::Title);

        let expected = SurfaceEvent::FocusChanged(Focus::SignatureField {
            index: 1,
            field: SignatureField::Title,
        });
        assert_eq!(a.try_recv().unwrap(), expected);
        assert_eq!(b.try_recv().unwrap(), expected);
        assert_eq!(surface.subscribers.len(), 2);
    }

    #[test]
    fn test_noops() {
        let (mut surface, _clock) = surface(Document::default(), sigs());

        assert!(!surface.insert_variable("   "));
        assert!(!surface.focus_signature(5, SignatureField::Text));
        assert!(surface.open_condition_editor("missing").is_none());
        assert!(!surface.close_condition_editor(ConditionHandle(42)));
        assert!(!surface.apply_case(CaseMode::Upper));
        assert!(!surface.select_in_signature(0, SignatureField::Text, 2..10));
        assert_eq!(surface.wrap_selection_in_conditional("A"), None);
    }

    #[test]
    fn test_apply_case_in_signature() {
        let (mut surface, _clock) = surface(
            Document::default(),
            vec![Signature::new("Firma", "sr. {{nombre_trabajador}}")],
        );

        assert!(surface.select_in_signature(0, SignatureField::Text, 4..25));
        assert!(surface.apply_case(CaseMode::TitleCase));
        assert_eq!(surface.signatures()[0].text, "sr. {{Nombre_Trabajador}}");
        assert_eq!(surface.signatures()[0].title, "Firma");
    }

    #[test]
    fn test_apply_case_in_document_keeps_marks() {
        let doc = Document::new(vec![Node::element(
            "p",
            vec![
                Node::text("el "),
                Node::element("strong", vec![Node::text("trabajador")]),
                Node::text(" firma"),
            ],
        )]);
        let (mut surface, _clock) = surface(doc, Vec::new());

        surface.select_in_document(0..13);
        assert!(surface.apply_case(CaseMode::Upper));
        assert_eq!(
            surface.body().document().nodes,
            vec![Node::element(
                "p",
                vec![
                    Node::text("EL "),
                    Node::element("strong", vec![Node::text("TRABAJADOR")]),
                    Node::text(" firma"),
                ],
            )]
        );
    }

    #[test]
    fn test_apply_case_in_condition_editor() {
        let (doc, block_id) = with_block();
        let (mut surface, _clock) = surface(doc, Vec::new());

        let handle = surface.open_condition_editor(&block_id).unwrap();
        surface.set_condition_text(handle, "cargo == gerente");
        assert!(surface.set_condition_selection(handle, 0..5));
        assert!(surface.apply_case(CaseMode::Upper));
        assert_eq!(
            surface.condition_editor(handle).unwrap().text,
            "CARGO == gerente"
        );
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let doc = Document::new(vec![
            Node::paragraph("uno"),
            Node::paragraph("dos"),
            Node::paragraph("tres"),
        ]);
        let (mut surface, _clock) = surface(doc, Vec::new());
        let events = surface.subscribe();

        surface.select_in_document(4..5);
        let id = surface.wrap_selection_in_conditional("TIENE_AUTO").unwrap();
        let translator = Translator::default();
        assert_eq!(
            translator.flatten(surface.body().document()).unwrap(),
            "<p>uno</p>[[IF:TIENE_AUTO]]<p>dos</p>[[ENDIF]]<p>tres</p>"
        );

        let handle = surface.open_condition_editor(&id).unwrap();
        assert!(surface.unwrap_conditional(&id));
        assert!(surface.condition_editor(handle).is_none());
        assert_eq!(surface.focus(), Focus::Document);
        assert_eq!(
            translator.flatten(surface.body().document()).unwrap(),
            "<p>uno</p><p>dos</p><p>tres</p>"
        );

        let events: Vec<_> = events.try_iter().collect();
        assert!(events.contains(&SurfaceEvent::BlockCreated {
            block_id: id.clone()
        }));
        assert!(events.contains(&SurfaceEvent::BlockRemoved { block_id: id }));
    }

    #[test]
    fn test_from_template_round_trip() {
        let template = Template {
            document_content: Some("<p>[[IF:A]]</p><p>x</p><p>[[ENDIF]]</p>".to_string()),
            signatures: vec![Signature::new("Empleador", "")],
            ..Default::default()
        };
        let translator = Translator::default();
        let config = EditorConfig::default();
        let mut surface = AuthoringSurface::from_template(&template, &translator, &config);

        surface.focus_signature(0, SignatureField::Text);
        surface.insert_variable("{{NOMBRE_EMPRESA}}");

        let mut edited = template.clone();
        surface.apply_signatures(&mut edited);
        assert_eq!(edited.signatures[0].text, "{{NOMBRE_EMPRESA}}");
        assert_eq!(
            translator.flatten_editor_html(&surface.editor_html(&translator)).unwrap(),
            "[[IF:A]]<p>x</p>[[ENDIF]]"
        );
    }
}
