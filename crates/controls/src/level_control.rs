use std::cmp::Ordering;
use std::collections::HashSet;

use foundation::error::IndoorError;
use foundation::ids::ListenerId;
use foundation::level::LevelId;
use runtime::event_bus::Emitter;
use runtime::level::{LevelChange, LevelSwitch};
use tracing::debug;

use crate::panel::{ControlPanel, ControlStyle, LevelButton, LevelCommand};
use crate::position::ControlPosition;

pub type ParseLevelFn = Box<dyn Fn(&str) -> Option<f64>>;

/// Base-10 parse of a label's leading integer: optional whitespace and sign,
/// then digits, ignoring whatever follows. `"2a"` is 2, `"Mezzanine"` is
/// `None`.
pub fn parse_leading_int(label: &str) -> Option<f64> {
    let s = label.trim_start();
    let (sign, rest) = match s.as_bytes().first().copied() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse::<f64>().ok().map(|n| sign * n)
}

pub struct LevelControlOptions {
    /// Button labels, in any order.
    pub levels: Vec<String>,
    /// Numeric rank of a label, used for ordering and for matching numeric
    /// level requests against labels.
    pub parse_level: ParseLevelFn,
    pub level: Option<LevelId>,
    pub position: ControlPosition,
    pub style: ControlStyle,
}

impl LevelControlOptions {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
            parse_level: Box::new(parse_leading_int),
            level: None,
            position: ControlPosition::default(),
            style: ControlStyle::default(),
        }
    }

    /// Labels taken from level ids, e.g. the levels of an indoor layer set.
    pub fn from_level_ids<'a>(levels: impl IntoIterator<Item = &'a LevelId>) -> Self {
        Self::new(levels.into_iter().map(|l| l.as_str().to_string()))
    }

    pub fn with_level(mut self, level: impl Into<LevelId>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_parse_level(mut self, parse: impl Fn(&str) -> Option<f64> + 'static) -> Self {
        self.parse_level = Box::new(parse);
        self
    }

    pub fn with_position(mut self, position: ControlPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_style(mut self, style: ControlStyle) -> Self {
        self.style = style;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LevelEntry {
    id: LevelId,
    label: String,
    rank: Option<f64>,
}

// Unparsable labels rank below every number.
fn cmp_rank(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Level selector: one button per floor, highest floor on top.
///
/// Requests are resolved against the labels first and then by parsed rank, so
/// `"1"`, `"01"` and `"+1"` all select the button labelled `"1"`. The same
/// rule decides highlighting and whether a request is a no-op.
pub struct LevelSwitchControl {
    // Top to bottom.
    entries: Vec<LevelEntry>,
    parse_level: ParseLevelFn,
    position: ControlPosition,
    style: ControlStyle,
    level: Option<LevelId>,
    panel: Option<ControlPanel>,
    level_changes: Emitter<LevelChange>,
}

impl LevelSwitchControl {
    pub fn new(options: LevelControlOptions) -> Result<Self, IndoorError> {
        if options.levels.is_empty() {
            return Err(IndoorError::EmptyLevelList);
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(options.levels.len());
        for label in options.levels {
            let id = LevelId::new(label.clone());
            if !seen.insert(id.clone()) {
                return Err(IndoorError::DuplicateLevel(id));
            }
            let rank = (options.parse_level)(&label).filter(|r| !r.is_nan());
            entries.push(LevelEntry { id, label, rank });
        }
        // Stable, so equal ranks keep their configured order.
        entries.sort_by(|a, b| cmp_rank(b.rank, a.rank));

        let mut control = Self {
            entries,
            parse_level: options.parse_level,
            position: options.position,
            style: options.style,
            level: None,
            panel: None,
            level_changes: Emitter::new(),
        };
        if let Some(requested) = options.level {
            control.level = Some(control.resolve(&requested)?);
        }
        Ok(control)
    }

    fn resolve(&self, requested: &LevelId) -> Result<LevelId, IndoorError> {
        if let Some(entry) = self.entries.iter().find(|e| &e.id == requested) {
            return Ok(entry.id.clone());
        }
        let rank = (self.parse_level)(requested.as_str()).filter(|r| !r.is_nan());
        rank.and_then(|rank| self.entries.iter().find(|e| e.rank == Some(rank)))
            .map(|entry| entry.id.clone())
            .ok_or_else(|| IndoorError::InvalidLevel(requested.clone()))
    }

    /// Level ids top to bottom.
    pub fn levels(&self) -> Vec<LevelId> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    pub fn level(&self) -> Option<&LevelId> {
        self.level.as_ref()
    }

    pub fn position(&self) -> ControlPosition {
        self.position
    }

    /// Builds the button panel. The control counts as attached to the map UI
    /// until [`Self::remove`].
    pub fn render(&mut self) -> Result<&ControlPanel, IndoorError> {
        if self.panel.is_some() {
            return Err(IndoorError::AlreadyRendered);
        }
        let buttons = self
            .entries
            .iter()
            .map(|entry| LevelButton {
                level: entry.id.clone(),
                label: entry.label.clone(),
                highlighted: self.level.as_ref() == Some(&entry.id),
                command: LevelCommand {
                    level: entry.id.clone(),
                },
            })
            .collect();
        debug!(buttons = self.entries.len(), position = self.position.as_str(), "rendered level control");
        Ok(self
            .panel
            .insert(ControlPanel::new(self.position, self.style.clone(), buttons)))
    }

    pub fn remove(&mut self) -> Result<ControlPanel, IndoorError> {
        self.panel.take().ok_or(IndoorError::NotAttached)
    }

    pub fn panel(&self) -> Option<&ControlPanel> {
        self.panel.as_ref()
    }

    pub fn is_rendered(&self) -> bool {
        self.panel.is_some()
    }

    /// Presses the button at `index` (0 is the top button).
    pub fn click(&mut self, index: usize) -> Result<(), IndoorError> {
        let panel = self.panel.as_ref().ok_or(IndoorError::NotAttached)?;
        let command = panel
            .button(index)
            .map(|b| b.command.clone())
            .ok_or(IndoorError::UnknownButton(index))?;
        self.execute(command)
    }

    /// Visual index of the button a level request resolves to.
    pub fn button_index(&self, level: impl Into<LevelId>) -> Result<usize, IndoorError> {
        let level = self.resolve(&level.into())?;
        let panel = self.panel.as_ref().ok_or(IndoorError::NotAttached)?;
        panel
            .buttons()
            .iter()
            .position(|b| b.level == level)
            .ok_or(IndoorError::InvalidLevel(level))
    }

    pub fn execute(&mut self, command: LevelCommand) -> Result<(), IndoorError> {
        self.set_level(command.level)
    }

    pub fn set_level(&mut self, level: impl Into<LevelId>) -> Result<(), IndoorError> {
        let level = self.resolve(&level.into())?;
        if self.level.as_ref() == Some(&level) {
            return Ok(());
        }
        let change = LevelChange::new(self.level.replace(level.clone()), level);
        self.highlight(&change);
        self.level_changes.emit(&change);
        Ok(())
    }

    // First listener of every level change, ahead of external subscribers.
    fn highlight(&mut self, change: &LevelChange) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        if let Some(old) = &change.old_level {
            panel.set_highlight(old, false);
        }
        panel.set_highlight(&change.new_level, true);
    }

    pub fn on_level_change(&mut self, listener: impl FnMut(&LevelChange) + 'static) -> ListenerId {
        self.level_changes.subscribe(listener)
    }

    pub fn off_level_change(&mut self, id: ListenerId) -> bool {
        self.level_changes.unsubscribe(id)
    }
}

impl LevelSwitch for LevelSwitchControl {
    fn current_level(&self) -> Option<&LevelId> {
        self.level()
    }

    fn request_level(&mut self, level: &LevelId) -> Result<(), IndoorError> {
        self.set_level(level)
    }

    fn watch_level(&mut self, listener: Box<dyn FnMut(&LevelChange)>) -> ListenerId {
        self.level_changes.subscribe_boxed(listener)
    }

    fn unwatch_level(&mut self, id: ListenerId) -> bool {
        self.level_changes.unsubscribe(id)
    }
}

impl std::fmt::Debug for LevelSwitchControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelSwitchControl")
            .field("entries", &self.entries)
            .field("level", &self.level)
            .field("rendered", &self.panel.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{LevelControlOptions, LevelSwitchControl, parse_leading_int};
    use crate::panel::ACTIVE_BACKGROUND;
    use foundation::error::IndoorError;
    use foundation::level::LevelId;
    use pretty_assertions::assert_eq;
    use runtime::level::LevelChange;

    fn control(levels: &[&str], level: Option<&str>) -> LevelSwitchControl {
        let mut opts = LevelControlOptions::new(levels.iter().copied());
        if let Some(level) = level {
            opts = opts.with_level(level);
        }
        LevelSwitchControl::new(opts).unwrap()
    }

    fn highlighted(c: &LevelSwitchControl) -> Vec<String> {
        c.panel()
            .unwrap()
            .highlighted()
            .iter()
            .map(|b| b.label.clone())
            .collect()
    }

    #[test]
    fn parses_like_parse_int() {
        assert_eq!(parse_leading_int("2"), Some(2.0));
        assert_eq!(parse_leading_int(" -1"), Some(-1.0));
        assert_eq!(parse_leading_int("+3"), Some(3.0));
        assert_eq!(parse_leading_int("2a"), Some(2.0));
        assert_eq!(parse_leading_int("Mezzanine"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn buttons_descend_by_parsed_level() {
        let mut c = control(&["1", "3", "2"], None);
        assert_eq!(c.render().unwrap().labels(), vec!["3", "2", "1"]);
    }

    #[test]
    fn negative_and_unparsable_labels_sort_below() {
        let mut c = control(&["Mezzanine", "-1", "10", "2", "Roof"], None);
        assert_eq!(
            c.render().unwrap().labels(),
            vec!["10", "2", "-1", "Mezzanine", "Roof"]
        );
    }

    #[test]
    fn custom_parse_level_orders_named_floors() {
        let opts = LevelControlOptions::new(["Mezzanine", "1", "0"]).with_parse_level(|label| {
            if label == "Mezzanine" {
                Some(0.5)
            } else {
                parse_leading_int(label)
            }
        });
        let mut c = LevelSwitchControl::new(opts).unwrap();
        assert_eq!(c.render().unwrap().labels(), vec!["1", "Mezzanine", "0"]);
    }

    #[test]
    fn initial_level_is_pre_highlighted() {
        let mut c = control(&["0", "1", "2"], Some("1"));
        let panel = c.render().unwrap();
        let button = panel.button_for(&LevelId::from("1")).unwrap();
        assert!(button.highlighted);
        assert_eq!(panel.background(button), ACTIVE_BACKGROUND);
        assert_eq!(panel.highlighted().len(), 1);
    }

    #[test]
    fn numeric_initial_level_matches_label() {
        let mut c = control(&["0", "1", "2"], None);
        c.set_level(1).unwrap();
        assert_eq!(c.level(), Some(&LevelId::from("1")));
        let mut c = LevelSwitchControl::new(
            LevelControlOptions::new(["00", "01"]).with_level(1),
        )
        .unwrap();
        c.render().unwrap();
        assert_eq!(highlighted(&c), vec!["01"]);
    }

    #[test]
    fn clicking_emits_and_moves_highlight() {
        let mut c = control(&["0", "1", "2"], Some("1"));
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        c.on_level_change(move |e| sink.borrow_mut().push(e.clone()));
        c.render().unwrap();

        // Top button is "2".
        c.click(0).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![LevelChange::new(
                Some(LevelId::from("1")),
                LevelId::from("2")
            )]
        );
        assert_eq!(highlighted(&c), vec!["2"]);
    }

    #[test]
    fn first_change_only_highlights() {
        let mut c = control(&["0", "1"], None);
        c.render().unwrap();
        assert!(highlighted(&c).is_empty());
        c.set_level("0").unwrap();
        assert_eq!(highlighted(&c), vec!["0"]);
    }

    #[test]
    fn repeated_level_is_a_no_op() {
        let mut c = control(&["0", "1"], Some("0"));
        let count = Rc::new(RefCell::new(0));
        let n = Rc::clone(&count);
        c.on_level_change(move |_| *n.borrow_mut() += 1);

        c.set_level("1").unwrap();
        c.set_level("1").unwrap();
        c.set_level("01").unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unknown_level_fails() {
        let mut c = control(&["0", "1"], None);
        assert_eq!(
            c.set_level("9"),
            Err(IndoorError::InvalidLevel(LevelId::from("9")))
        );
        assert_eq!(c.level(), None);
    }

    #[test]
    fn changes_before_render_are_shown_on_render() {
        let mut c = control(&["0", "1"], Some("0"));
        c.set_level("1").unwrap();
        c.render().unwrap();
        assert_eq!(highlighted(&c), vec!["1"]);
    }

    #[test]
    fn render_twice_requires_remove() {
        let mut c = control(&["0"], None);
        c.render().unwrap();
        assert_eq!(c.render().err(), Some(IndoorError::AlreadyRendered));
        c.remove().unwrap();
        assert!(c.render().is_ok());
        assert_eq!(c.click(5), Err(IndoorError::UnknownButton(5)));
    }

    #[test]
    fn button_index_follows_resolution() {
        let mut c = control(&["1", "3", "2"], None);
        assert_eq!(c.button_index("3"), Err(IndoorError::NotAttached));
        c.render().unwrap();
        assert_eq!(c.button_index("3"), Ok(0));
        assert_eq!(c.button_index("+1"), Ok(2));
        assert_eq!(
            c.button_index("7"),
            Err(IndoorError::InvalidLevel(LevelId::from("7")))
        );

        c.click(c.button_index("02").unwrap()).unwrap();
        assert_eq!(c.level(), Some(&LevelId::from("2")));
    }

    #[test]
    fn click_without_panel_fails() {
        let mut c = control(&["0"], None);
        assert_eq!(c.click(0), Err(IndoorError::NotAttached));
        assert_eq!(c.remove().err(), Some(IndoorError::NotAttached));
    }

    #[test]
    fn validates_options() {
        assert_eq!(
            LevelSwitchControl::new(LevelControlOptions::new(Vec::<String>::new())).err(),
            Some(IndoorError::EmptyLevelList)
        );
        assert_eq!(
            LevelSwitchControl::new(LevelControlOptions::new(["1", "1"])).err(),
            Some(IndoorError::DuplicateLevel(LevelId::from("1")))
        );
        assert_eq!(
            LevelSwitchControl::new(LevelControlOptions::new(["1"]).with_level("B")).err(),
            Some(IndoorError::InvalidLevel(LevelId::from("B")))
        );
    }
}
