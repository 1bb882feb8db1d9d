//! Orden cronológico de paradas

use chrono::NaiveDateTime;

use crate::models::{NewStop, Stop, StopInput};

/// Algo que ocurrió en un momento dado
pub trait Timed {
    fn moment(&self) -> NaiveDateTime;
}

impl Timed for Stop {
    fn moment(&self) -> NaiveDateTime {
        self.moment
    }
}

impl Timed for StopInput {
    fn moment(&self) -> NaiveDateTime {
        self.moment
    }
}

impl Timed for NewStop {
    fn moment(&self) -> NaiveDateTime {
        self.input.moment
    }
}

/// `true` si `stop` ocurrió estrictamente después de `other`.
/// Sin `other` el resultado siempre es `false`.
pub fn is_after<A: Timed + ?Sized, B: Timed + ?Sized>(stop: &A, other: Option<&B>) -> bool {
    other.is_some_and(|other| stop.moment() > other.moment())
}
