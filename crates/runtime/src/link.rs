use std::sync::mpsc::{self, Receiver};

use foundation::error::IndoorError;
use foundation::ids::ListenerId;
use foundation::level::LevelId;
use tracing::trace;

use crate::level::LevelSwitch;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Hop {
    ToFirst(LevelId),
    ToSecond(LevelId),
}

/// Two-way level synchronisation between two [`LevelSwitch`]es.
///
/// Level changes on either side are queued on a channel rather than applied
/// from inside the emitting component, so neither side is re-entered while it
/// is still mutating itself. [`LevelLink::pump`] delivers the queue; the
/// receiving side's equal-level no-op stops the echo after one round trip.
#[derive(Debug)]
pub struct LevelLink {
    hops: Receiver<Hop>,
    first_listener: ListenerId,
    second_listener: ListenerId,
}

impl LevelLink {
    pub fn connect<A, B>(first: &mut A, second: &mut B) -> Self
    where
        A: LevelSwitch + ?Sized,
        B: LevelSwitch + ?Sized,
    {
        let (tx, hops) = mpsc::channel();

        let to_second = tx.clone();
        let first_listener = first.watch_level(Box::new(move |change| {
            // The receiver only goes away together with the link.
            let _ = to_second.send(Hop::ToSecond(change.new_level.clone()));
        }));
        let second_listener = second.watch_level(Box::new(move |change| {
            let _ = tx.send(Hop::ToFirst(change.new_level.clone()));
        }));

        Self {
            hops,
            first_listener,
            second_listener,
        }
    }

    /// Applies every queued change to the opposite side.
    ///
    /// Returns the number of hops delivered. On error the failing hop is
    /// consumed and later hops stay queued for the next call.
    pub fn pump<A, B>(&self, first: &mut A, second: &mut B) -> Result<usize, IndoorError>
    where
        A: LevelSwitch + ?Sized,
        B: LevelSwitch + ?Sized,
    {
        let mut delivered = 0usize;
        while let Ok(hop) = self.hops.try_recv() {
            trace!(?hop, "level link hop");
            match hop {
                Hop::ToFirst(level) => first.request_level(&level)?,
                Hop::ToSecond(level) => second.request_level(&level)?,
            }
            delivered += 1;
        }
        Ok(delivered)
    }

    pub fn disconnect<A, B>(self, first: &mut A, second: &mut B)
    where
        A: LevelSwitch + ?Sized,
        B: LevelSwitch + ?Sized,
    {
        first.unwatch_level(self.first_listener);
        second.unwatch_level(self.second_listener);
    }
}

#[cfg(test)]
mod tests {
    use super::LevelLink;
    use crate::event_bus::Emitter;
    use crate::level::{LevelChange, LevelSwitch};
    use foundation::error::IndoorError;
    use foundation::ids::ListenerId;
    use foundation::level::LevelId;
    use pretty_assertions::assert_eq;

    struct Floors {
        known: Vec<LevelId>,
        level: Option<LevelId>,
        changes: Emitter<LevelChange>,
        switches: usize,
    }

    impl Floors {
        fn new(known: &[&str]) -> Self {
            Self {
                known: known.iter().map(|s| LevelId::from(*s)).collect(),
                level: None,
                changes: Emitter::new(),
                switches: 0,
            }
        }
    }

    impl LevelSwitch for Floors {
        fn current_level(&self) -> Option<&LevelId> {
            self.level.as_ref()
        }

        fn request_level(&mut self, level: &LevelId) -> Result<(), IndoorError> {
            if self.level.as_ref() == Some(level) {
                return Ok(());
            }
            if !self.known.contains(level) {
                return Err(IndoorError::InvalidLevel(level.clone()));
            }
            let change = LevelChange::new(self.level.replace(level.clone()), level.clone());
            self.switches += 1;
            self.changes.emit(&change);
            Ok(())
        }

        fn watch_level(&mut self, listener: Box<dyn FnMut(&LevelChange)>) -> ListenerId {
            self.changes.subscribe_boxed(listener)
        }

        fn unwatch_level(&mut self, id: ListenerId) -> bool {
            self.changes.unsubscribe(id)
        }
    }

    #[test]
    fn propagates_both_ways_and_settles() {
        let mut a = Floors::new(&["0", "1"]);
        let mut b = Floors::new(&["0", "1"]);
        let link = LevelLink::connect(&mut a, &mut b);

        a.request_level(&LevelId::from("1")).unwrap();
        // a -> b, then b's echo back to a is a no-op.
        assert_eq!(link.pump(&mut a, &mut b).unwrap(), 2);
        assert_eq!(b.current_level(), Some(&LevelId::from("1")));
        assert_eq!((a.switches, b.switches), (1, 1));

        b.request_level(&LevelId::from("0")).unwrap();
        link.pump(&mut a, &mut b).unwrap();
        assert_eq!(a.current_level(), Some(&LevelId::from("0")));
        assert_eq!(link.pump(&mut a, &mut b).unwrap(), 0);
    }

    #[test]
    fn surfaces_unknown_levels() {
        let mut a = Floors::new(&["0", "5"]);
        let mut b = Floors::new(&["0"]);
        let link = LevelLink::connect(&mut a, &mut b);

        a.request_level(&LevelId::from("5")).unwrap();
        assert_eq!(
            link.pump(&mut a, &mut b),
            Err(IndoorError::InvalidLevel(LevelId::from("5")))
        );
    }

    #[test]
    fn disconnect_stops_propagation() {
        let mut a = Floors::new(&["0", "1"]);
        let mut b = Floors::new(&["0", "1"]);
        let link = LevelLink::connect(&mut a, &mut b);
        link.disconnect(&mut a, &mut b);

        a.request_level(&LevelId::from("1")).unwrap();
        assert!(a.changes.is_empty());
        assert_eq!(b.current_level(), None);
    }
}
