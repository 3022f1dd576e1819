//! Content stream interpreter.
//!
//! Walks the operators of a page (or form XObject) content stream, tracks
//! graphics and text state, and reports glyphs and painted paths to a
//! [`ContentHandler`]. Colour, clipping, images and marked content are not
//! interpreted.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object};
use reportgrid_core::{ExtractOptions, ExtractWarning, ExtractWarningCode, Matrix};

use crate::error::BackendError;
use crate::fonts::{Font, number, resolve};
use crate::handler::{CharEvent, ContentHandler, PaintOp, PathEvent, Subpath};
use crate::text_state::{TextParams, TextState};

/// Read a stream's bytes, decompressing when a filter is present.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Interpret a page content stream from the initial graphics state.
pub(crate) fn interpret_content_stream(
    doc: &Document,
    content: &[u8],
    resources: &Dictionary,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
) -> Result<(), BackendError> {
    StreamInterpreter::new(doc, resources, options, 0, Matrix::identity(), TextParams::default())
        .run(content, handler)
}

fn operand_f64(operands: &[Object], index: usize) -> Option<f64> {
    operands.get(index).and_then(number)
}

fn operand_name(operands: &[Object], index: usize) -> Option<String> {
    match operands.get(index) {
        Some(Object::Name(n)) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

fn operand_bytes(operands: &[Object], index: usize) -> Option<&[u8]> {
    match operands.get(index) {
        Some(Object::String(bytes, _)) => Some(bytes.as_slice()),
        _ => None,
    }
}

fn matrix_from(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let v: Vec<f64> = operands.iter().take(6).filter_map(number).collect();
    (v.len() == 6).then(|| Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5]))
}

/// Accumulates subpaths between construction and painting operators.
#[derive(Debug, Default)]
struct PathBuilder {
    subpaths: Vec<Subpath>,
    current: Vec<(f64, f64)>,
}

impl PathBuilder {
    fn flush(&mut self, closed: bool) {
        let points = std::mem::take(&mut self.current);
        if points.len() > 1 {
            self.subpaths.push(Subpath {
                points,
                closed,
                from_rect: false,
            });
        }
    }

    fn move_to(&mut self, p: (f64, f64)) {
        self.flush(false);
        self.current.push(p);
    }

    fn line_to(&mut self, p: (f64, f64)) {
        self.current.push(p);
    }

    /// Curves are not rulings: end the polyline and continue from the
    /// curve's end point.
    fn curve_to(&mut self, end: (f64, f64)) {
        self.flush(false);
        self.current.push(end);
    }

    fn close(&mut self) {
        let start = self.current.first().copied();
        self.flush(true);
        if let Some(start) = start {
            self.current.push(start);
        }
    }

    fn rect(&mut self, corners: [(f64, f64); 4]) {
        self.flush(false);
        self.subpaths.push(Subpath {
            points: corners.to_vec(),
            closed: true,
            from_rect: true,
        });
    }

    fn take(&mut self) -> Vec<Subpath> {
        self.flush(false);
        std::mem::take(&mut self.subpaths)
    }
}

/// Interpreter for one content stream with its own resources.
struct StreamInterpreter<'a> {
    doc: &'a Document,
    resources: &'a Dictionary,
    options: &'a ExtractOptions,
    depth: usize,
    ctm: Matrix,
    stack: Vec<(Matrix, TextParams)>,
    text: TextState,
    path: PathBuilder,
    fonts: HashMap<String, Rc<Font>>,
}

impl<'a> StreamInterpreter<'a> {
    fn new(
        doc: &'a Document,
        resources: &'a Dictionary,
        options: &'a ExtractOptions,
        depth: usize,
        ctm: Matrix,
        params: TextParams,
    ) -> Self {
        let mut text = TextState::new();
        text.params = params;
        Self {
            doc,
            resources,
            options,
            depth,
            ctm,
            stack: Vec::new(),
            text,
            path: PathBuilder::default(),
            fonts: HashMap::new(),
        }
    }

    fn run(&mut self, content: &[u8], handler: &mut dyn ContentHandler) -> Result<(), BackendError> {
        let content = Content::decode(content)
            .map_err(|e| BackendError::Interpreter(format!("failed to decode content stream: {e}")))?;
        for op in &content.operations {
            self.apply(&op.operator, &op.operands, handler)?;
        }
        Ok(())
    }

    fn warn(&self, handler: &mut dyn ContentHandler, warning: ExtractWarning) {
        if self.options.collect_warnings {
            handler.on_warning(warning);
        }
    }

    fn user_to_page(&self, operands: &[Object], x: usize, y: usize) -> Option<(f64, f64)> {
        let (x, y) = (operand_f64(operands, x)?, operand_f64(operands, y)?);
        Some(self.ctm.apply(x, y))
    }

    fn apply(
        &mut self,
        operator: &str,
        operands: &[Object],
        handler: &mut dyn ContentHandler,
    ) -> Result<(), BackendError> {
        match operator {
            // --- Graphics state ---
            "q" => self.stack.push((self.ctm, self.text.params.clone())),
            "Q" => {
                if let Some((ctm, params)) = self.stack.pop() {
                    self.ctm = ctm;
                    self.text.params = params;
                }
            }
            "cm" => {
                if let Some(m) = matrix_from(operands) {
                    self.ctm = m.multiply(&self.ctm);
                }
            }

            // --- Text state ---
            "BT" => self.text.begin_text(),
            "ET" => {}
            "Tf" => {
                if let Some(name) = operand_name(operands, 0) {
                    self.text.params.font_size = operand_f64(operands, 1).unwrap_or(0.0);
                    self.font(&name, handler);
                    self.text.params.font = Some(name);
                }
            }
            "Tc" => {
                if let Some(v) = operand_f64(operands, 0) {
                    self.text.params.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = operand_f64(operands, 0) {
                    self.text.params.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = operand_f64(operands, 0) {
                    self.text.params.h_scaling = v / 100.0;
                }
            }
            "TL" => {
                if let Some(v) = operand_f64(operands, 0) {
                    self.text.params.leading = v;
                }
            }
            "Ts" => {
                if let Some(v) = operand_f64(operands, 0) {
                    self.text.params.rise = v;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (operand_f64(operands, 0), operand_f64(operands, 1)) {
                    self.text.move_text_position(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (operand_f64(operands, 0), operand_f64(operands, 1)) {
                    self.text.move_text_position_and_set_leading(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_from(operands) {
                    self.text.set_text_matrix(m);
                }
            }
            "T*" => self.text.move_to_next_line(),

            // --- Text showing ---
            "Tj" => {
                if let Some(bytes) = operand_bytes(operands, 0) {
                    self.show(bytes, handler);
                }
            }
            "'" => {
                self.text.move_to_next_line();
                if let Some(bytes) = operand_bytes(operands, 0) {
                    self.show(bytes, handler);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (operand_f64(operands, 0), operand_f64(operands, 1)) {
                    self.text.params.word_spacing = aw;
                    self.text.params.char_spacing = ac;
                }
                self.text.move_to_next_line();
                if let Some(bytes) = operand_bytes(operands, 2) {
                    self.show(bytes, handler);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes, handler),
                            other => {
                                if let Some(n) = number(other) {
                                    let tx = self.text.adjustment_advance(n);
                                    self.text.advance(tx);
                                }
                            }
                        }
                    }
                }
            }

            // --- Path construction ---
            "m" => {
                if let Some(p) = self.user_to_page(operands, 0, 1) {
                    self.path.move_to(p);
                }
            }
            "l" => {
                if let Some(p) = self.user_to_page(operands, 0, 1) {
                    self.path.line_to(p);
                }
            }
            "c" => {
                if let Some(p) = self.user_to_page(operands, 4, 5) {
                    self.path.curve_to(p);
                }
            }
            "v" | "y" => {
                if let Some(p) = self.user_to_page(operands, 2, 3) {
                    self.path.curve_to(p);
                }
            }
            "re" => {
                let v: Vec<f64> = operands.iter().take(4).filter_map(number).collect();
                if let [x, y, w, h] = v[..] {
                    self.path.rect([
                        self.ctm.apply(x, y),
                        self.ctm.apply(x + w, y),
                        self.ctm.apply(x + w, y + h),
                        self.ctm.apply(x, y + h),
                    ]);
                }
            }
            "h" => self.path.close(),

            // --- Path painting ---
            "S" => self.paint(PaintOp::Stroke, handler),
            "s" => {
                self.path.close();
                self.paint(PaintOp::Stroke, handler);
            }
            "f" | "F" | "f*" => self.paint(PaintOp::Fill, handler),
            "B" | "B*" => self.paint(PaintOp::FillAndStroke, handler),
            "b" | "b*" => {
                self.path.close();
                self.paint(PaintOp::FillAndStroke, handler);
            }
            "n" => {
                self.path.take();
            }

            // --- XObjects ---
            "Do" => {
                if let Some(name) = operand_name(operands, 0) {
                    self.do_xobject(&name, handler)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn paint(&mut self, paint_op: PaintOp, handler: &mut dyn ContentHandler) {
        let mut subpaths = self.path.take();
        if subpaths.is_empty() {
            return;
        }
        if paint_op != PaintOp::Stroke {
            // Filling closes every open subpath.
            for sp in &mut subpaths {
                sp.closed = true;
            }
        }
        handler.on_path_painted(PathEvent { subpaths, paint_op });
    }

    fn resource(&self, category: &[u8], name: &str) -> Option<&'a Object> {
        let (doc, resources) = (self.doc, self.resources);
        let entries = resources
            .get(category)
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())?;
        entries.get(name.as_bytes()).ok().map(|o| resolve(doc, o))
    }

    /// Font for a resource name, loading it on first use. Missing or broken
    /// fonts are replaced by a fallback after a warning.
    fn font(&mut self, name: &str, handler: &mut dyn ContentHandler) -> Rc<Font> {
        if let Some(font) = self.fonts.get(name) {
            return Rc::clone(font);
        }
        let loaded = match self.resource(b"Font", name).and_then(|o| o.as_dict().ok()) {
            Some(dict) => Font::load(self.doc, dict).map_err(|e| {
                ExtractWarning::with_code(ExtractWarningCode::MalformedObject, e.to_string())
            }),
            None => Err(ExtractWarning::with_code(
                ExtractWarningCode::MissingFont,
                format!("font /{name} not found in page resources"),
            )),
        };
        let font = match loaded {
            Ok(font) => font,
            Err(warning) => {
                tracing::debug!(font = name, "{}", warning.description);
                self.warn(handler, warning.set_font(name));
                Font::fallback(name)
            }
        };
        let font = Rc::new(font);
        self.fonts.insert(name.to_string(), Rc::clone(&font));
        font
    }

    fn show(&mut self, bytes: &[u8], handler: &mut dyn ContentHandler) {
        let name = self.text.params.font.clone().unwrap_or_default();
        let font = self.font(&name, handler);
        for glyph in font.decode(bytes) {
            let params = &self.text.params;
            handler.on_char(CharEvent {
                char_code: glyph.code,
                unicode: glyph.text,
                font_name: font.name.clone(),
                font_size: params.font_size,
                text_matrix: self.text.text_matrix(),
                ctm: self.ctm,
                displacement: glyph.width,
                h_scaling: params.h_scaling,
                rise: params.rise,
                ascent: font.ascent,
                descent: font.descent,
            });
            let tx = self.text.glyph_advance(glyph.width, glyph.is_word_space);
            self.text.advance(tx);
        }
    }

    fn do_xobject(&mut self, name: &str, handler: &mut dyn ContentHandler) -> Result<(), BackendError> {
        let Some(stream) = self.resource(b"XObject", name).and_then(|o| o.as_stream().ok()) else {
            self.warn(
                handler,
                ExtractWarning::with_code(
                    ExtractWarningCode::MalformedObject,
                    format!("XObject /{name} not found in resources"),
                ),
            );
            return Ok(());
        };
        let is_form = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|s| s == b"Form");
        if !is_form {
            return Ok(());
        }

        if self.depth + 1 > self.options.max_recursion_depth {
            tracing::debug!(xobject = name, depth = self.depth, "form nesting limit reached");
            self.warn(
                handler,
                ExtractWarning::with_code(
                    ExtractWarningCode::ResourceLimitReached,
                    format!(
                        "form XObject /{name} exceeds nesting limit {}",
                        self.options.max_recursion_depth
                    ),
                ),
            );
            return Ok(());
        }

        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| o.as_array().ok())
            .and_then(|a| matrix_from(a))
            .unwrap_or_default();
        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .map(|o| resolve(self.doc, o))
            .and_then(|o| o.as_dict().ok())
            .unwrap_or(self.resources);
        let content = stream_bytes(stream)?;

        let mut form = StreamInterpreter::new(
            self.doc,
            resources,
            self.options,
            self.depth + 1,
            matrix.multiply(&self.ctm),
            self.text.params.clone(),
        );
        if let Err(e) = form.run(&content, handler) {
            self.warn(
                handler,
                ExtractWarning::with_code(
                    ExtractWarningCode::MalformedObject,
                    format!("form XObject /{name}: {e}"),
                ),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    #[derive(Default)]
    struct Collecting {
        chars: Vec<CharEvent>,
        paths: Vec<PathEvent>,
        warnings: Vec<ExtractWarning>,
    }

    impl ContentHandler for Collecting {
        fn on_char(&mut self, event: CharEvent) {
            self.chars.push(event);
        }
        fn on_path_painted(&mut self, event: PathEvent) {
            self.paths.push(event);
        }
        fn on_warning(&mut self, warning: ExtractWarning) {
            self.warnings.push(warning);
        }
    }

    fn helvetica_resources() -> Dictionary {
        dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                },
            },
        }
    }

    fn run(doc: &Document, content: &[u8], resources: &Dictionary, options: &ExtractOptions) -> Collecting {
        let mut handler = Collecting::default();
        interpret_content_stream(doc, content, resources, &mut handler, options).unwrap();
        handler
    }

    fn text(chars: &[CharEvent]) -> String {
        chars.iter().map(|c| c.unicode.as_str()).collect()
    }

    #[test]
    fn tj_emits_chars_and_advances() {
        let doc = Document::with_version("1.5");
        let out = run(
            &doc,
            b"BT /F1 10 Tf 72 700 Td (Hi) Tj ET",
            &helvetica_resources(),
            &ExtractOptions::default(),
        );
        assert_eq!(text(&out.chars), "Hi");
        assert_eq!(out.chars[0].text_matrix.e, 72.0);
        // H is 722 units wide at 10pt.
        assert!((out.chars[1].text_matrix.e - 79.22).abs() < 1e-9);
        assert_eq!(out.chars[0].font_name, "Helvetica");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn tj_array_numbers_shift_position() {
        let doc = Document::with_version("1.5");
        let out = run(
            &doc,
            b"BT /F1 10 Tf [(A) -1000 (B)] TJ ET",
            &helvetica_resources(),
            &ExtractOptions::default(),
        );
        assert_eq!(text(&out.chars), "AB");
        // A advances 6.67, then -1000 moves 10 further right.
        assert!((out.chars[1].text_matrix.e - 16.67).abs() < 1e-9);
    }

    #[test]
    fn quote_operators_move_to_next_line() {
        let doc = Document::with_version("1.5");
        let out = run(
            &doc,
            b"BT /F1 10 Tf 12 TL 0 100 Td (a) Tj (b) ' 1 0 (c) \" ET",
            &helvetica_resources(),
            &ExtractOptions::default(),
        );
        assert_eq!(text(&out.chars), "abc");
        assert_eq!(out.chars[1].text_matrix.f, 88.0);
        assert_eq!(out.chars[2].text_matrix.f, 76.0);
    }

    #[test]
    fn q_restores_ctm() {
        let doc = Document::with_version("1.5");
        let out = run(
            &doc,
            b"q 2 0 0 2 0 0 cm BT /F1 10 Tf (a) Tj ET Q BT /F1 10 Tf (b) Tj ET",
            &helvetica_resources(),
            &ExtractOptions::default(),
        );
        assert_eq!(out.chars[0].ctm.a, 2.0);
        assert_eq!(out.chars[1].ctm, Matrix::identity());
    }

    #[test]
    fn missing_font_warns_once_and_falls_back() {
        let doc = Document::with_version("1.5");
        let out = run(
            &doc,
            b"BT /F9 12 Tf (ab) Tj (c) Tj ET",
            &Dictionary::new(),
            &ExtractOptions::default(),
        );
        assert_eq!(text(&out.chars), "abc");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, ExtractWarningCode::MissingFont);
        assert_eq!(out.warnings[0].font_name.as_deref(), Some("F9"));
    }

    #[test]
    fn warnings_can_be_disabled() {
        let doc = Document::with_version("1.5");
        let options = ExtractOptions {
            collect_warnings: false,
            ..ExtractOptions::default()
        };
        let out = run(&doc, b"BT /F9 12 Tf (a) Tj ET", &Dictionary::new(), &options);
        assert_eq!(out.chars.len(), 1);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn rectangles_and_lines_are_painted() {
        let doc = Document::with_version("1.5");
        let out = run(
            &doc,
            b"10 10 100 50 re S 0 0 m 50 0 l 50 50 l S 5 5 m 6 6 l n",
            &Dictionary::new(),
            &ExtractOptions::default(),
        );
        assert_eq!(out.paths.len(), 2);
        let rect = &out.paths[0].subpaths[0];
        assert!(rect.from_rect);
        assert_eq!(rect.points[2], (110.0, 60.0));
        let poly = &out.paths[1].subpaths[0];
        assert_eq!(poly.points, vec![(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]);
        assert!(!poly.closed);
    }

    #[test]
    fn path_points_use_ctm_at_construction() {
        let doc = Document::with_version("1.5");
        let out = run(
            &doc,
            b"1 0 0 1 100 200 cm 0 0 m 10 0 l S",
            &Dictionary::new(),
            &ExtractOptions::default(),
        );
        assert_eq!(out.paths[0].subpaths[0].points, vec![(100.0, 200.0), (110.0, 200.0)]);
    }

    #[test]
    fn fill_closes_subpaths() {
        let doc = Document::with_version("1.5");
        let out = run(
            &doc,
            b"0 0 m 10 0 l 10 10 l f",
            &Dictionary::new(),
            &ExtractOptions::default(),
        );
        assert!(out.paths[0].subpaths[0].closed);
        assert_eq!(out.paths[0].paint_op, PaintOp::Fill);
    }

    fn form_resources(doc: &mut Document) -> Dictionary {
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 50.into(), 0.into()],
                "Resources" => helvetica_resources(),
            },
            b"BT /F1 10 Tf (x) Tj ET 0 0 m 10 0 l S".to_vec(),
        );
        let form_id = doc.add_object(form);
        dictionary! { "XObject" => dictionary! { "Fx" => form_id } }
    }

    #[test]
    fn form_xobject_content_is_interpreted() {
        let mut doc = Document::with_version("1.5");
        let resources = form_resources(&mut doc);
        let out = run(&doc, b"/Fx Do", &resources, &ExtractOptions::default());
        assert_eq!(text(&out.chars), "x");
        assert_eq!(out.chars[0].ctm.e, 50.0);
        assert_eq!(out.paths[0].subpaths[0].points[0], (50.0, 0.0));
    }

    #[test]
    fn form_nesting_limit_warns() {
        let mut doc = Document::with_version("1.5");
        let resources = form_resources(&mut doc);
        let options = ExtractOptions {
            max_recursion_depth: 0,
            ..ExtractOptions::default()
        };
        let out = run(&doc, b"/Fx Do", &resources, &options);
        assert!(out.chars.is_empty());
        assert_eq!(out.warnings[0].code, ExtractWarningCode::ResourceLimitReached);
    }
}
