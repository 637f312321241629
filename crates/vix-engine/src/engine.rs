//! The engine façade — one key event in, one frame out.
//!
//! `Engine` owns the buffer, cursor, registers, history, options, and all
//! transient parse state. [`Engine::handle_key`] drives the mode state
//! machine, routes grammar keys through the pending-command resolver, and
//! notifies the [`Host`] with a fresh [`Frame`] after every handled event.
//!
//! # Transactions
//!
//! Every change groups into exactly one history transaction: an operator
//! application opens and commits around its edits; an insert or replace
//! session opens on entry and commits on Escape, so a whole typing burst
//! undoes as a unit. Pure motions never touch history.
//!
//! # Dot repeat
//!
//! `.` replays the keys of the last completed change. Recording starts at
//! the change's initiating key; count digits typed before it are kept
//! aside so a count typed before `.` can override them.

use tracing::{debug, error};

use vix_core::buffer::{Buffer, EditResult};
use vix_core::cursor::{Cursor, first_non_blank};
use vix_core::edit::end_of_text;
use vix_core::history::History;
use vix_core::object::{self, Extent, TextObjectKind};
use vix_core::position::{Position, Range, Shape};
use vix_core::register::RegisterFile;

use crate::command::{Command, CommandLine, parse_command};
use crate::host::{Frame, Host, PersistRequest, StatusReport};
use crate::key::{Key, KeyEvent};
use crate::mode::{Mode, VisualKind};
use crate::motion::{self, Find, Motion};
use crate::operator::{self, Operator};
use crate::options::Options;
use crate::pending::{Await, Pending};
use crate::search::{self, SearchDirection};

/// How close (in host sequence-marker units) two keys must be for the
/// `jk` insert-mode exit to trigger.
const QUICK_EXIT_WINDOW: u64 = 350;

/// The last completed change, for `.`.
#[derive(Debug, Clone, Default)]
struct DotRecord {
    /// The count typed before the initiating key, if any.
    count: Option<usize>,
    /// The keys of the change, initiating key first, digits before it
    /// excluded.
    keys: Vec<KeyEvent>,
}

/// A modal editing engine over one in-memory buffer.
pub struct Engine {
    buf: Buffer,
    cursor: Cursor,
    history: History,
    registers: RegisterFile,
    options: Options,
    mode: Mode,
    pending: Pending,
    command_line: Option<CommandLine>,

    // Search state.
    last_pattern: String,
    last_direction: SearchDirection,

    // `;` / `,` repeat.
    last_find: Option<(Find, char)>,

    // Dot repeat.
    dot: Option<DotRecord>,
    recording: Option<DotRecord>,
    replaying: bool,

    // Pending `j` for the jk quick exit (seq marker of the press).
    quick_exit_j: Option<u64>,

    status: Option<String>,
    quit: bool,
}

impl Engine {
    /// A fresh engine over an empty buffer.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            buf: Buffer::new(),
            cursor: Cursor::new(),
            history: History::new(),
            registers: RegisterFile::new(),
            options,
            mode: Mode::Normal,
            pending: Pending::new(),
            command_line: None,
            last_pattern: String::new(),
            last_direction: SearchDirection::Forward,
            last_find: None,
            dot: None,
            recording: None,
            replaying: false,
            quick_exit_j: None,
            status: None,
            quit: false,
        }
    }

    /// Replace the buffer contents, resetting history, pending state, and
    /// the cursor. Registers and options survive a load.
    pub fn load(&mut self, text: &str) {
        self.buf = Buffer::from_text(text);
        self.cursor = Cursor::new();
        self.history = History::new();
        self.pending.clear();
        self.mode = Mode::Normal;
        self.command_line = None;
        self.recording = None;
        self.status = None;
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buf
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// True after `:q` (or `:wq`/`:q!`) asked the host to shut down.
    #[inline]
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    // -- Host-facing entry points -------------------------------------------

    /// Process one key event to completion and render the result.
    pub fn handle_key(&mut self, ev: KeyEvent, host: &mut dyn Host) {
        self.dispatch(ev, host);
        host.render(&self.frame());
    }

    /// Host → engine outcome of an earlier persistence request. Shown as
    /// a status message; a successful save clears the modified flag.
    pub fn report_status(&mut self, report: StatusReport) {
        if report.success && report.saved {
            self.buf.mark_saved();
        }
        self.status = Some(report.message);
    }

    /// Snapshot for the render callback.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let lines = (0..self.buf.line_count())
            .map(|i| self.buf.line_text(i).unwrap_or_default())
            .collect();
        Frame {
            lines,
            cursor: self.cursor.position(),
            mode: self.mode,
            selection: self.visual_span(),
            command_line: self
                .command_line
                .as_ref()
                .map(|cl| format!("{}{}", cl.prompt(), cl.input())),
            status: self.status.clone(),
        }
    }

    // -- Dispatch -----------------------------------------------------------

    fn dispatch(&mut self, ev: KeyEvent, host: &mut dyn Host) {
        match self.mode {
            Mode::Normal | Mode::Visual(_) => self.handle_grammar(ev, host),
            Mode::Insert => self.handle_insert(ev),
            Mode::Replace => self.handle_replace(ev),
            Mode::Command => self.handle_command_line(ev, host),
        }
    }

    /// An unextendable key: discard pending state, ring the bell.
    fn invalid(&mut self, host: &mut dyn Host) {
        self.pending.clear();
        self.dot_cancel();
        host.bell();
    }

    // -- Dot repeat plumbing ------------------------------------------------

    fn dot_begin(&mut self) {
        if !self.replaying {
            self.recording = Some(DotRecord {
                count: self.pending.explicit_count(),
                keys: Vec::new(),
            });
        }
    }

    fn dot_push(&mut self, ev: KeyEvent) {
        if !self.replaying {
            if let Some(rec) = &mut self.recording {
                rec.keys.push(ev);
            }
        }
    }

    fn dot_commit(&mut self) {
        if !self.replaying {
            if let Some(rec) = self.recording.take() {
                self.dot = Some(rec);
            }
        }
    }

    fn dot_cancel(&mut self) {
        if !self.replaying {
            self.recording = None;
        }
    }

    fn dot_replay(&mut self, host: &mut dyn Host) {
        let Some(record) = self.dot.clone() else {
            return;
        };
        let count = self.pending.explicit_count().or(record.count);
        self.pending.clear();
        self.replaying = true;
        if let Some(n) = count {
            for digit in n.to_string().chars() {
                self.dispatch(KeyEvent::ch(digit), host);
            }
        }
        for ev in record.keys {
            self.dispatch(ev, host);
        }
        self.replaying = false;
    }

    // -- Grammar (Normal + Visual) ------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn handle_grammar(&mut self, ev: KeyEvent, host: &mut dyn Host) {
        // Every key that extends an in-flight change lands in the dot
        // recording; `dot_begin` resets the key list, so the initiating
        // arms push their own key after beginning.
        self.dot_push(ev);

        // Multi-key productions waiting for their argument.
        match self.pending.awaiting() {
            Await::RegisterName => return self.take_register_name(ev, host),
            Await::Gee => return self.take_gee(ev, host),
            Await::FindChar(find) => return self.take_find_char(find, ev, host),
            Await::ReplaceChar => return self.take_replace_char(ev, host),
            Await::ObjectKind(extent) => return self.take_object(extent, ev, host),
            Await::None => {}
        }

        if ev.key == Key::Escape {
            self.pending.clear();
            self.dot_cancel();
            if self.mode.is_visual() {
                self.leave_visual();
            }
            return;
        }
        if ev.is_ctrl('r') {
            self.redo();
            return;
        }
        if ev.is_ctrl('v') {
            self.toggle_visual(VisualKind::Block);
            return;
        }

        let Some(ch) = ev.plain_char() else {
            // Arrow keys as plain motions; anything else is invalid.
            let motion = match ev.key {
                Key::Left => Some(Motion::Left),
                Key::Right => Some(Motion::Right),
                Key::Up => Some(Motion::Up),
                Key::Down => Some(Motion::Down),
                Key::Home => Some(Motion::LineStart),
                Key::End => Some(Motion::LineEnd),
                _ => None,
            };
            match motion {
                Some(m) => self.run_motion(m, host),
                None => self.invalid(host),
            }
            return;
        };

        // Count digits accumulate silently; they are not part of the dot
        // recording (the stored count handles them), except count2 digits
        // typed after the initiating key.
        if let Some(digit) = ch.to_digit(10) {
            if digit != 0 || self.pending.zero_is_digit() {
                self.pending.push_count_digit(digit);
                return;
            }
        }

        match ch {
            '"' => self.pending.set_awaiting(Await::RegisterName),
            'g' => self.pending.set_awaiting(Await::Gee),
            'd' | 'c' | 'y' | '>' | '<' => self.operator_key(ch, ev, host),
            'i' | 'a' if self.pending.operator().is_some() || self.mode.is_visual() => {
                let extent = if ch == 'i' { Extent::Inner } else { Extent::Around };
                self.pending.set_awaiting(Await::ObjectKind(extent));
            }
            'f' | 'F' | 't' | 'T' => {
                if let Some(find) = Find::from_char(ch) {
                    self.pending.set_awaiting(Await::FindChar(find));
                }
            }
            ';' | ',' => self.repeat_find(ch == ',', host),
            // Insert entries (Normal only — in Visual, `i`/`a` were taken
            // as text-object prefixes above).
            'i' | 'a' | 'I' | 'A' | 'o' | 'O' if self.mode == Mode::Normal => {
                self.dot_begin();
                self.dot_push(ev);
                self.enter_insert(ch);
            }
            'v' => self.toggle_visual(VisualKind::Char),
            'V' => self.toggle_visual(VisualKind::Line),
            'x' => self.change_shorthand(ev, Motion::Right, Operator::Delete, host),
            'X' => self.change_shorthand(ev, Motion::Left, Operator::Delete, host),
            'D' => self.change_shorthand(ev, Motion::LineEnd, Operator::Delete, host),
            'C' => self.change_shorthand(ev, Motion::LineEnd, Operator::Change, host),
            's' => self.change_shorthand(ev, Motion::Right, Operator::Change, host),
            'Y' => self.yank_lines(),
            '~' => self.toggle_case(ev),
            'r' if self.mode == Mode::Normal => {
                self.dot_begin();
                self.dot_push(ev);
                self.pending.set_awaiting(Await::ReplaceChar);
            }
            'R' if self.mode == Mode::Normal => {
                self.dot_begin();
                self.dot_push(ev);
                self.history.begin(self.cursor.position());
                self.mode = Mode::Replace;
            }
            'p' => self.paste(ev, true),
            'P' => self.paste(ev, false),
            'u' => self.undo(),
            '.' if self.mode == Mode::Normal => self.dot_replay(host),
            'n' => self.search_next(self.last_direction),
            'N' => self.search_next(self.last_direction.opposite()),
            'o' if self.mode.is_visual() => self.cursor.swap_anchor(),
            ':' | '/' | '?' if self.mode == Mode::Normal => {
                self.pending.clear();
                self.status = None;
                self.command_line = Some(CommandLine::new(ch));
                self.mode = Mode::Command;
            }
            _ => match Motion::from_char(ch) {
                Some(Motion::LastLine) => {
                    // {count}G is an absolute line target.
                    let m = match self.pending.explicit_count() {
                        Some(n) => Motion::Line(n.saturating_sub(1)),
                        None => Motion::LastLine,
                    };
                    self.run_motion(m, host);
                }
                Some(m) => self.run_motion(m, host),
                None => self.invalid(host),
            },
        }
    }

    // -- Awaited arguments --------------------------------------------------

    fn take_register_name(&mut self, ev: KeyEvent, host: &mut dyn Host) {
        match ev.plain_char() {
            Some(name) if name.is_ascii_alphanumeric() => {
                self.pending.set_register(name);
                self.pending.set_awaiting(Await::None);
            }
            _ => self.invalid(host),
        }
    }

    fn take_gee(&mut self, ev: KeyEvent, host: &mut dyn Host) {
        self.pending.set_awaiting(Await::None);
        match ev.plain_char() {
            Some('g') => {
                let m = match self.pending.explicit_count() {
                    Some(n) => Motion::Line(n.saturating_sub(1)),
                    None => Motion::FirstLine,
                };
                self.run_motion(m, host);
            }
            Some('$') => self.run_motion(Motion::ScreenLineEnd, host),
            _ => self.invalid(host),
        }
    }

    fn take_find_char(&mut self, find: Find, ev: KeyEvent, host: &mut dyn Host) {
        self.pending.set_awaiting(Await::None);
        match ev.plain_char() {
            Some(ch) => {
                self.last_find = Some((find, ch));
                self.run_motion(Motion::CharFind(find, ch), host);
            }
            None => self.invalid(host),
        }
    }

    fn repeat_find(&mut self, reversed: bool, host: &mut dyn Host) {
        let Some((find, ch)) = self.last_find else {
            self.pending.clear();
            return;
        };
        let find = if reversed { find.reversed() } else { find };
        self.run_motion(Motion::CharFind(find, ch), host);
    }

    fn take_replace_char(&mut self, ev: KeyEvent, host: &mut dyn Host) {
        self.pending.set_awaiting(Await::None);
        let Some(ch) = ev.plain_char() else {
            return self.invalid(host);
        };
        let count = self.pending.effective_count(&self.options);
        self.pending.clear();

        let pos = self.cursor.position();
        let len = self.buf.line_content_len(pos.line).unwrap_or(0);
        // Vim refuses `r` when fewer than count chars remain on the line.
        if pos.col + count > len {
            self.dot_cancel();
            host.bell();
            return;
        }
        let range = Range::new(pos, pos.with_col(pos.col + count));
        let replacement = ch.to_string().repeat(count);
        self.history.begin(pos);
        let replaced = self.replace_range(range, &replacement);
        if self.run(replaced).is_some() {
            self.cursor
                .set_position(pos.with_col(pos.col + count - 1), &self.buf, false);
            self.history.commit(self.cursor.position());
            self.dot_commit();
        }
    }

    fn take_object(&mut self, extent: Extent, ev: KeyEvent, host: &mut dyn Host) {
        self.pending.set_awaiting(Await::None);
        let span = ev
            .plain_char()
            .and_then(TextObjectKind::from_char)
            .and_then(|kind| {
                object::resolve(&self.buf, self.cursor.position(), kind, extent)
            });
        let Some(span) = span else {
            return self.invalid(host);
        };

        if let Some(op) = self.pending.operator() {
            let register = self.pending.register();
            self.pending.clear();
            self.apply_operator(op, span.range, span.shape, register);
        } else if self.mode.is_visual() {
            // Reshape the selection to the object.
            self.pending.clear();
            if span.range.is_empty() {
                return;
            }
            self.cursor.set_anchor_at(span.range.start);
            let end_idx = self.buf.pos_to_char_idx(span.range.end).unwrap_or(1);
            let last = self.buf.char_idx_to_pos(end_idx.saturating_sub(1)).unwrap_or_default();
            self.cursor.set_position(last, &self.buf, false);
            if span.shape.is_line() {
                self.mode = Mode::Visual(VisualKind::Line);
            }
        }
    }

    // -- Operators ----------------------------------------------------------

    fn operator_key(&mut self, ch: char, ev: KeyEvent, host: &mut dyn Host) {
        let Some(op) = Operator::from_char(ch) else {
            return self.invalid(host);
        };

        // Visual mode: the selection is the target.
        if self.mode.is_visual() {
            if let Some((range, shape)) = self.visual_span() {
                let register = self.pending.register();
                self.pending.clear();
                self.leave_visual();
                self.apply_operator(op, range, shape, register);
            }
            return;
        }

        match self.pending.operator() {
            None => {
                self.dot_begin();
                self.dot_push(ev);
                self.pending.set_operator(op);
            }
            Some(prev) if prev == op => {
                // Doubled operator: linewise over count lines.
                let count = self.pending.effective_count(&self.options);
                let register = self.pending.register();
                self.pending.clear();
                let line = self.cursor.line();
                let range = self.buf.line_range(line, line + count - 1);
                self.apply_operator(op, range, Shape::Line, register);
            }
            Some(_) => self.invalid(host),
        }
    }

    /// Run a motion: with an operator pending, apply it over the motion's
    /// range; otherwise move the cursor (extending the selection in
    /// visual mode).
    fn run_motion(&mut self, m: Motion, host: &mut dyn Host) {
        let count = self.pending.effective_count(&self.options);
        let op = self.pending.operator();
        let from = self.cursor.position();

        let Some(target) =
            motion::evaluate(m, &self.buf, from, count, &self.options, op.is_some())
        else {
            // Failed char find: the whole pending command dies.
            self.invalid(host);
            return;
        };

        if let Some(op) = op {
            let register = self.pending.register();
            self.pending.clear();
            if target.range.is_empty() {
                self.dot_cancel();
                return;
            }
            self.apply_operator(op, target.range, target.shape, register);
        } else {
            self.pending.clear();
            self.move_cursor_to(m, target.pos);
        }
    }

    /// Bare-motion cursor placement: vertical motions keep the sticky
    /// column, `$` pins it to line ends, everything else resets it.
    fn move_cursor_to(&mut self, m: Motion, pos: Position) {
        let past_end = self.mode.cursor_past_end();
        if m.is_vertical() {
            self.cursor.set_line_keeping_col(pos.line, &self.buf, past_end);
        } else if matches!(m, Motion::LineEnd) {
            self.cursor.set_position(pos, &self.buf, past_end);
            self.cursor.move_to_line_end(&self.buf, past_end);
        } else {
            self.cursor.set_position(pos, &self.buf, past_end);
        }
    }

    fn apply_operator(
        &mut self,
        op: Operator,
        range: Range,
        shape: Shape,
        register: Option<char>,
    ) {
        if range.is_empty() {
            self.dot_cancel();
            return;
        }
        debug!(?op, ?shape, "applying operator");
        let text = operator::yank_text(&self.buf, range, shape);

        match op {
            Operator::Yank => {
                self.registers.store_yank(register, text, shape);
                if range.start < self.cursor.position() {
                    self.cursor.set_position(range.start, &self.buf, false);
                }
                self.dot_cancel(); // yanks are not changes
            }
            Operator::Delete => {
                self.registers.store_delete(register, text, shape);
                self.history.begin(self.cursor.position());
                let deleted =
                    operator::delete_span(&mut self.buf, &mut self.history, range, shape);
                if self.run(deleted).is_some() {
                    self.place_cursor_after_delete(range, shape);
                    self.history.commit(self.cursor.position());
                    self.dot_commit();
                }
            }
            Operator::Change => {
                self.registers.store_delete(register, text, shape);
                self.history.begin(self.cursor.position());
                let deleted =
                    operator::delete_span(&mut self.buf, &mut self.history, range, shape);
                if self.run(deleted).is_some() {
                    if shape.is_line() {
                        self.reopen_changed_line(range.start.line);
                    } else {
                        self.cursor.set_position(range.start, &self.buf, true);
                    }
                    // The transaction stays open; the insert session that
                    // follows commits it on Escape.
                    self.mode = Mode::Insert;
                }
            }
            Operator::Indent | Operator::Dedent => {
                self.history.begin(self.cursor.position());
                let dedent = op == Operator::Dedent;
                let shifted = operator::shift_lines(
                    &mut self.buf,
                    &mut self.history,
                    range,
                    &self.options,
                    dedent,
                );
                if self.run(shifted).is_some() {
                    let line = range.start.line.min(self.buf.last_line());
                    self.cursor.set_position(
                        Position::new(line, first_non_blank(&self.buf, line)),
                        &self.buf,
                        false,
                    );
                    self.history.commit(self.cursor.position());
                    self.dot_commit();
                }
            }
        }
    }

    fn place_cursor_after_delete(&mut self, range: Range, shape: Shape) {
        let pos = if shape.is_line() {
            let line = range.start.line.min(self.buf.last_line());
            Position::new(line, first_non_blank(&self.buf, line))
        } else {
            range.start
        };
        self.cursor.set_position(pos, &self.buf, false);
    }

    /// After a linewise change, the deleted lines collapse into one fresh
    /// empty line the insert session starts on.
    fn reopen_changed_line(&mut self, line: usize) {
        let line = line.min(self.buf.last_line());
        if self.buf.line_content_len(line).unwrap_or(0) > 0 {
            let terminator = self.buf.line_ending().as_str().to_string();
            let opened = self
                .buf
                .insert(Position::new(line, 0), &terminator)
                .map(|inv| self.history.record(inv));
            let _ = self.run(opened);
        }
        self.cursor.set_position(Position::new(line, 0), &self.buf, true);
    }

    /// `x X D C s` — operator shorthands over a fixed motion.
    fn change_shorthand(&mut self, ev: KeyEvent, m: Motion, op: Operator, host: &mut dyn Host) {
        // Visual `x` behaves like `d` on the selection.
        if self.mode.is_visual() {
            if let Some((range, shape)) = self.visual_span() {
                let register = self.pending.register();
                self.pending.clear();
                self.leave_visual();
                self.apply_operator(op, range, shape, register);
            }
            return;
        }
        self.dot_begin();
        self.dot_push(ev);
        let count = self.pending.effective_count(&self.options);
        let register = self.pending.register();
        self.pending.clear();
        let from = self.cursor.position();
        if let Some(target) =
            motion::evaluate(m, &self.buf, from, count, &self.options, true)
        {
            if target.range.is_empty() {
                self.dot_cancel();
                return;
            }
            self.apply_operator(op, target.range, target.shape, register);
        } else {
            self.invalid(host);
        }
    }

    /// `Y` — yank whole lines, like `yy`.
    fn yank_lines(&mut self) {
        let count = self.pending.effective_count(&self.options);
        let register = self.pending.register();
        self.pending.clear();
        let line = self.cursor.line();
        let range = self.buf.line_range(line, line + count - 1);
        self.apply_operator(Operator::Yank, range, Shape::Line, register);
    }

    /// `~` — toggle case under the cursor, advancing.
    fn toggle_case(&mut self, ev: KeyEvent) {
        self.dot_begin();
        self.dot_push(ev);
        let count = self.pending.effective_count(&self.options);
        self.pending.clear();
        let pos = self.cursor.position();
        let len = self.buf.line_content_len(pos.line).unwrap_or(0);
        let end_col = (pos.col + count).min(len);
        if end_col == pos.col {
            self.dot_cancel();
            return;
        }
        let range = Range::new(pos, pos.with_col(end_col));
        let toggled: String = self
            .buf
            .slice(range)
            .map(|s| {
                s.chars()
                    .map(|c| {
                        if c.is_uppercase() {
                            c.to_lowercase().collect::<String>()
                        } else {
                            c.to_uppercase().collect::<String>()
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        self.history.begin(pos);
        let replaced = self.replace_range(range, &toggled);
        if self.run(replaced).is_some() {
            self.cursor.set_position(pos.with_col(end_col), &self.buf, false);
            self.history.commit(self.cursor.position());
            self.dot_commit();
        }
    }

    // -- Paste --------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn paste(&mut self, ev: KeyEvent, after: bool) {
        self.dot_begin();
        self.dot_push(ev);
        let count = self.pending.effective_count(&self.options);
        let register = self.pending.register();
        self.pending.clear();

        let reg = self.registers.get(register);
        let (text, shape) = (reg.content().to_string(), reg.shape());
        if text.is_empty() {
            self.dot_cancel();
            return;
        }

        let cur = self.cursor.position();
        let line_len = self.buf.line_content_len(cur.line).unwrap_or(0);
        self.history.begin(cur);

        let ok = match shape {
            Shape::Char => {
                let body = text.repeat(count);
                let col = if after && line_len > 0 { (cur.col + 1).min(line_len) } else { cur.col };
                let at = Position::new(cur.line, col);
                let inserted =
                    self.buf.insert(at, &body).map(|inv| self.history.record(inv));
                let placed = self.run(inserted);
                if placed.is_some() {
                    // Land on the last pasted character.
                    let end = end_of_text(at, &body);
                    let last = self
                        .buf
                        .pos_to_char_idx(end)
                        .and_then(|idx| self.buf.char_idx_to_pos(idx.saturating_sub(1)))
                        .unwrap_or(at);
                    self.cursor.set_position(last, &self.buf, false);
                }
                placed.is_some()
            }
            Shape::Line => {
                let body = text.repeat(count);
                let inserted = if after {
                    if cur.line == self.buf.last_line() {
                        // No terminator after the last line: lead with one
                        // and drop the trailing copy.
                        let at = self.buf.end_position();
                        let glued = format!(
                            "{}{}",
                            self.buf.line_ending().as_str(),
                            body.trim_end_matches(['\n', '\r'])
                        );
                        self.buf.insert(at, &glued).map(|inv| self.history.record(inv))
                    } else {
                        let at = Position::new(cur.line + 1, 0);
                        self.buf.insert(at, &body).map(|inv| self.history.record(inv))
                    }
                } else {
                    let at = Position::new(cur.line, 0);
                    self.buf.insert(at, &body).map(|inv| self.history.record(inv))
                };
                let placed = self.run(inserted);
                if placed.is_some() {
                    let line = if after { cur.line + 1 } else { cur.line };
                    let line = line.min(self.buf.last_line());
                    self.cursor.set_position(
                        Position::new(line, first_non_blank(&self.buf, line)),
                        &self.buf,
                        false,
                    );
                }
                placed.is_some()
            }
            Shape::Block => {
                let col = if after && line_len > 0 { (cur.col + 1).min(line_len) } else { cur.col };
                let mut ok = true;
                for (i, fragment) in text.split('\n').enumerate() {
                    let body = fragment.repeat(count);
                    let line = cur.line + i;
                    let insertion = if line > self.buf.last_line() {
                        // Grow the buffer downward for the overhang.
                        let at = self.buf.end_position();
                        let padded = format!(
                            "{}{}{}",
                            self.buf.line_ending().as_str(),
                            " ".repeat(col),
                            body
                        );
                        self.buf.insert(at, &padded)
                    } else {
                        let len = self.buf.line_content_len(line).unwrap_or(0);
                        if len < col {
                            let padded = format!("{}{}", " ".repeat(col - len), body);
                            self.buf.insert(Position::new(line, len), &padded)
                        } else {
                            self.buf.insert(Position::new(line, col), &body)
                        }
                    };
                    let recorded = insertion.map(|inv| self.history.record(inv));
                    if self.run(recorded).is_none() {
                        ok = false;
                        break;
                    }
                }
                if ok {
                    self.cursor.set_position(Position::new(cur.line, col), &self.buf, false);
                }
                ok
            }
        };

        if ok {
            self.history.commit(self.cursor.position());
            self.dot_commit();
        } else {
            self.history.abort();
            self.dot_cancel();
        }
    }

    // -- Undo / redo --------------------------------------------------------

    fn undo(&mut self) {
        self.pending.clear();
        match self.history.undo(&mut self.buf) {
            Ok(Some(pos)) => {
                self.cursor.set_position(pos, &self.buf, false);
            }
            Ok(None) => {} // empty stack: silent no-op
            Err(err) => error!(%err, "undo replay failed"),
        }
        self.cursor.clamp(&self.buf, false);
    }

    fn redo(&mut self) {
        self.pending.clear();
        match self.history.redo(&mut self.buf) {
            Ok(Some(pos)) => {
                self.cursor.set_position(pos, &self.buf, false);
            }
            Ok(None) => {}
            Err(err) => error!(%err, "redo replay failed"),
        }
        self.cursor.clamp(&self.buf, false);
    }

    // -- Visual mode --------------------------------------------------------

    /// Enter visual mode with a shape, switch shape in place, or leave it
    /// when the active shape's key is pressed again.
    fn toggle_visual(&mut self, kind: VisualKind) {
        self.pending.clear();
        match self.mode {
            Mode::Visual(active) if active == kind => self.leave_visual(),
            Mode::Visual(_) => self.mode = Mode::Visual(kind),
            _ => {
                self.cursor.set_anchor();
                self.mode = Mode::Visual(kind);
            }
        }
    }

    fn leave_visual(&mut self) {
        self.cursor.clear_anchor();
        self.mode = Mode::Normal;
    }

    /// The active selection as an operator span. Charwise selections are
    /// inclusive of the cursor's character; linewise cover whole lines;
    /// block spans carry their corners.
    #[must_use]
    fn visual_span(&self) -> Option<(Range, Shape)> {
        let Mode::Visual(kind) = self.mode else {
            return None;
        };
        let sel = self.cursor.selection()?;
        Some(match kind {
            VisualKind::Char => {
                let end = self
                    .buf
                    .pos_to_char_idx(sel.end)
                    .and_then(|idx| self.buf.char_idx_to_pos(idx + 1))
                    .unwrap_or(sel.end);
                (Range::new(sel.start, end), Shape::Char)
            }
            VisualKind::Line => (
                self.buf.line_range(sel.start.line, sel.end.line),
                Shape::Line,
            ),
            VisualKind::Block => (sel, Shape::Block),
        })
    }

    // -- Insert / Replace ---------------------------------------------------

    fn enter_insert(&mut self, entry: char) {
        self.pending.clear();
        self.history.begin(self.cursor.position());
        let line = self.cursor.line();
        match entry {
            'i' => {}
            'a' => self.cursor.move_right(1, &self.buf, true),
            'I' => self.cursor.move_to_first_non_blank(&self.buf, true),
            'A' => {
                let len = self.buf.line_content_len(line).unwrap_or(0);
                self.cursor.set_position(Position::new(line, len), &self.buf, true);
            }
            'o' => {
                let len = self.buf.line_content_len(line).unwrap_or(0);
                let terminator = self.buf.line_ending().as_str().to_string();
                let opened = self
                    .buf
                    .insert(Position::new(line, len), &terminator)
                    .map(|inv| self.history.record(inv));
                let _ = self.run(opened);
                self.cursor.set_position(Position::new(line + 1, 0), &self.buf, true);
            }
            'O' => {
                let terminator = self.buf.line_ending().as_str().to_string();
                let opened = self
                    .buf
                    .insert(Position::new(line, 0), &terminator)
                    .map(|inv| self.history.record(inv));
                let _ = self.run(opened);
                self.cursor.set_position(Position::new(line, 0), &self.buf, true);
            }
            _ => {}
        }
        self.mode = Mode::Insert;
    }

    /// Leave an input session: commit the open transaction as one undo
    /// step and step the cursor back onto a character.
    fn leave_input(&mut self) {
        self.quick_exit_j = None;
        self.cursor.move_left(1, &self.buf, false);
        self.cursor.clamp(&self.buf, false);
        self.history.commit(self.cursor.position());
        self.mode = Mode::Normal;
        self.dot_commit();
    }

    fn handle_insert(&mut self, ev: KeyEvent) {
        self.dot_push(ev);
        match ev.key {
            Key::Escape => self.leave_input(),
            Key::Enter => {
                self.quick_exit_j = None;
                let terminator = self.buf.line_ending().as_str().to_string();
                self.insert_literal(&terminator);
            }
            Key::Tab => {
                self.quick_exit_j = None;
                let text = if self.options.expand_tab {
                    let width = self.options.tab_width.max(1);
                    " ".repeat(width - self.cursor.col() % width)
                } else {
                    "\t".to_string()
                };
                self.insert_literal(&text);
            }
            Key::Backspace => {
                self.quick_exit_j = None;
                self.backspace();
            }
            _ => {
                if let Some(ch) = ev.plain_char() {
                    // jk within the timing window backs out the `j` and
                    // leaves insert mode.
                    if ch == 'k' {
                        if let Some(j_seq) = self.quick_exit_j.take() {
                            if ev.seq.saturating_sub(j_seq) <= QUICK_EXIT_WINDOW {
                                self.backspace();
                                self.leave_input();
                                return;
                            }
                        }
                    }
                    self.quick_exit_j = (ch == 'j').then_some(ev.seq);
                    self.insert_literal(&ch.to_string());
                }
            }
        }
    }

    fn insert_literal(&mut self, text: &str) {
        let pos = self.cursor.position();
        let inserted = self.buf.insert(pos, text).map(|inv| self.history.record(inv));
        if self.run(inserted).is_some() {
            let end = end_of_text(pos, text);
            self.cursor.set_position(end, &self.buf, true);
        }
    }

    /// Backspace in an input session: delete the previous char, joining
    /// onto the previous line at column 0.
    fn backspace(&mut self) {
        let pos = self.cursor.position();
        let start = if pos.col > 0 {
            pos.with_col(pos.col - 1)
        } else if pos.line > 0 {
            let prev_len = self.buf.line_content_len(pos.line - 1).unwrap_or(0);
            Position::new(pos.line - 1, prev_len)
        } else {
            return;
        };
        let range = Range::new(start, pos);
        let deleted = self.buf.delete(range).map(|inv| self.history.record(inv));
        if self.run(deleted).is_some() {
            self.cursor.set_position(start, &self.buf, true);
        }
    }

    fn handle_replace(&mut self, ev: KeyEvent) {
        self.dot_push(ev);
        match ev.key {
            Key::Escape => self.leave_input(),
            Key::Backspace => {
                // Replace-mode backspace just steps back; overwritten
                // characters are restored by undoing the session.
                self.cursor.move_left(1, &self.buf, true);
            }
            Key::Enter => {
                let terminator = self.buf.line_ending().as_str().to_string();
                self.insert_literal(&terminator);
            }
            _ => {
                if let Some(ch) = ev.plain_char() {
                    let pos = self.cursor.position();
                    let len = self.buf.line_content_len(pos.line).unwrap_or(0);
                    let result = if pos.col < len {
                        let range = Range::new(pos, pos.with_col(pos.col + 1));
                        self.replace_range(range, &ch.to_string())
                    } else {
                        self.buf
                            .insert(pos, &ch.to_string())
                            .map(|inv| self.history.record(inv))
                    };
                    if self.run(result).is_some() {
                        self.cursor.set_position(pos.with_col(pos.col + 1), &self.buf, true);
                    }
                }
            }
        }
    }

    // -- Command line -------------------------------------------------------

    fn handle_command_line(&mut self, ev: KeyEvent, host: &mut dyn Host) {
        let Some(cl) = &mut self.command_line else {
            self.mode = Mode::Normal;
            return;
        };
        match ev.key {
            Key::Escape => {
                self.command_line = None;
                self.mode = Mode::Normal;
            }
            Key::Enter => {
                let (prompt, input) = (cl.prompt(), cl.input().to_string());
                self.command_line = None;
                self.mode = Mode::Normal;
                match prompt {
                    ':' => self.execute_command(&input, host),
                    '/' => self.execute_search(&input, SearchDirection::Forward),
                    '?' => self.execute_search(&input, SearchDirection::Backward),
                    _ => {}
                }
            }
            Key::Backspace => {
                if !cl.backspace() {
                    // Backspacing over the prompt closes it.
                    self.command_line = None;
                    self.mode = Mode::Normal;
                }
            }
            Key::Left => cl.move_left(),
            Key::Right => cl.move_right(),
            _ => {
                if let Some(ch) = ev.plain_char() {
                    cl.insert_char(ch);
                }
            }
        }
    }

    fn execute_command(&mut self, input: &str, host: &mut dyn Host) {
        let cmd = parse_command(input);
        debug!(?cmd, "executing command");
        match cmd {
            Command::Write => {
                host.persist(PersistRequest::Save { path: None, content: self.buf.contents() });
            }
            Command::WriteAs(path) => {
                host.persist(PersistRequest::Save {
                    path: Some(path),
                    content: self.buf.contents(),
                });
            }
            Command::Quit => {
                if self.buf.is_modified() {
                    self.status =
                        Some("unsaved changes (add ! to discard)".to_string());
                } else {
                    self.quit = true;
                }
            }
            Command::ForceQuit => self.quit = true,
            Command::WriteQuit => {
                host.persist(PersistRequest::Save { path: None, content: self.buf.contents() });
                self.quit = true;
            }
            Command::Edit(path) => {
                host.persist(PersistRequest::Load { path });
            }
            Command::Set(directives) => {
                for directive in &directives {
                    match self.options.apply(directive) {
                        Ok(Some(message)) => self.status = Some(message),
                        Ok(None) => {}
                        Err(message) => {
                            self.status = Some(message);
                            break;
                        }
                    }
                }
            }
            Command::Unknown(input) => {
                self.status = Some(format!("not an editor command: {input}"));
            }
        }
    }

    fn execute_search(&mut self, input: &str, direction: SearchDirection) {
        if !input.is_empty() {
            self.last_pattern = input.to_string();
        }
        self.last_direction = direction;
        self.search_next(direction);
    }

    fn search_next(&mut self, direction: SearchDirection) {
        self.pending.clear();
        if self.last_pattern.is_empty() {
            self.status = Some("no previous search pattern".to_string());
            return;
        }
        let from = self.cursor.position();
        let hit = match direction {
            SearchDirection::Forward => {
                search::find_forward(&self.buf, &self.last_pattern, from.with_col(from.col + 1))
            }
            SearchDirection::Backward => {
                search::find_backward(&self.buf, &self.last_pattern, from)
            }
        };
        match hit {
            Some(m) => {
                self.cursor.set_position(m.start, &self.buf, false);
                self.status = None;
            }
            None => {
                self.status = Some(format!("pattern not found: {}", self.last_pattern));
            }
        }
    }

    // -- Edit plumbing ------------------------------------------------------

    /// Replace `range` with `text`, recording both inverses.
    fn replace_range(&mut self, range: Range, text: &str) -> EditResult<()> {
        let inverses = self.buf.replace(range, text)?;
        for inverse in inverses {
            self.history.record(inverse);
        }
        Ok(())
    }

    /// Unwrap an internal edit result. Positions are validated before any
    /// primitive edit is issued, so an error here is a dispatch bug; it
    /// is logged and the operation is dropped without mutating further.
    fn run<T>(&mut self, result: EditResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                error!(%err, "internal edit rejected");
                self.history.abort();
                None
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Options::default())
    }
}
