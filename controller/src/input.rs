//! Discrete input vocabulary consumed by the controller.

/// Held or pressed controls the controller understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Sprint,
    Interact,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Sprint,
        Action::Interact,
    ];

    /// True for actions held as part of the movement intent.
    #[inline]
    pub fn is_movement(self) -> bool {
        !matches!(self, Action::Interact)
    }
}

/// One input edge or delta, delivered before the tick that consumes it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Pressed(Action),
    Released(Action),
    /// Pointer movement in pixels since the previous event.
    Look { dx: f32, dy: f32 },
    /// Scroll delta; positive moves the camera away.
    Scroll(f32),
    /// Whether pointer look is currently captured by the host.
    LookActive(bool),
}

/// Currently-held movement controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntentFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

impl IntentFlags {
    /// Update the flag for `action`. Non-movement actions are ignored.
    pub fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::Forward => self.forward = held,
            Action::Backward => self.backward = held,
            Action::Left => self.left = held,
            Action::Right => self.right = held,
            Action::Sprint => self.sprint = held,
            Action::Interact => {}
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Any direction key held. Opposing keys still count as moving.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_release_each_movement_flag() {
        let mut flags = IntentFlags::default();
        for action in Action::ALL.into_iter().filter(|a| a.is_movement()) {
            flags.set(action, true);
        }
        assert!(flags.forward && flags.backward && flags.left && flags.right && flags.sprint);

        flags.set(Action::Sprint, false);
        assert!(!flags.sprint);
        assert!(flags.is_moving());
    }

    #[test]
    fn interact_is_not_an_intent_flag() {
        let mut flags = IntentFlags::default();
        flags.set(Action::Interact, true);
        assert!(flags.is_empty());
    }

    #[test]
    fn sprint_alone_is_not_moving() {
        let mut flags = IntentFlags::default();
        flags.set(Action::Sprint, true);
        assert!(!flags.is_moving());

        flags.clear();
        assert!(flags.is_empty());
    }
}
