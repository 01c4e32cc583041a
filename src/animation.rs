//! Per-chart animation frame ownership.
//!
//! A chart owns one [`AnimationHandle`]. Scheduling a new frame cancels the
//! one still pending for the same chart, so a zoom transition that is
//! superseded by another never paints a stale frame.

use std::cell::Cell;
use std::rc::Rc;

pub type FrameId = u64;

/// Receives the host's frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// The host's frame-callback mechanism.
pub trait FrameScheduler {
    fn request_frame(&mut self, callback: FrameCallback) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
}

#[derive(Debug, Default)]
pub struct AnimationHandle {
    pending: Rc<Cell<Option<FrameId>>>,
    generation: Rc<Cell<u64>>,
}

impl AnimationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    pub fn cancel_prior_animation(&mut self, scheduler: &mut dyn FrameScheduler) {
        // callbacks of older generations turn into no-ops even if the host
        // fires them after cancellation
        self.generation.set(self.generation.get().wrapping_add(1));
        if let Some(id) = self.pending.take() {
            tracing::trace!(frame = id, "cancelling superseded animation frame");
            scheduler.cancel_frame(id);
        }
    }

    pub fn schedule_animation(&mut self, scheduler: &mut dyn FrameScheduler, callback: impl FnOnce(f64) + 'static) {
        self.cancel_prior_animation(scheduler);
        let generation = self.generation.get();
        let current = Rc::clone(&self.generation);
        let pending = Rc::clone(&self.pending);
        let id = scheduler.request_frame(Box::new(move |timestamp| {
            if current.get() != generation {
                return;
            }
            pending.set(None);
            callback(timestamp);
        }));
        self.pending.set(Some(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct ManualScheduler {
        next_id: FrameId,
        queued: Vec<(FrameId, FrameCallback)>,
        cancelled: Vec<FrameId>,
    }

    impl ManualScheduler {
        fn fire_all(&mut self, timestamp: f64) {
            for (_, callback) in std::mem::take(&mut self.queued) {
                callback(timestamp);
            }
        }
    }

    impl FrameScheduler for ManualScheduler {
        fn request_frame(&mut self, callback: FrameCallback) -> FrameId {
            self.next_id += 1;
            self.queued.push((self.next_id, callback));
            self.next_id
        }

        fn cancel_frame(&mut self, id: FrameId) {
            self.cancelled.push(id);
            self.queued.retain(|(queued, _)| *queued != id);
        }
    }

    #[test]
    fn newer_animation_supersedes_older() {
        let mut scheduler = ManualScheduler::default();
        let mut handle = AnimationHandle::new();
        let painted = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&painted);
        handle.schedule_animation(&mut scheduler, move |_| log.borrow_mut().push("first"));
        let log = Rc::clone(&painted);
        handle.schedule_animation(&mut scheduler, move |_| log.borrow_mut().push("second"));

        assert_eq!(scheduler.cancelled, vec![1]);
        assert!(handle.is_pending());
        scheduler.fire_all(16.0);
        assert_eq!(*painted.borrow(), vec!["second"]);
        assert!(!handle.is_pending());
    }

    #[test]
    fn late_callbacks_of_cancelled_frames_are_ignored() {
        struct LeakyScheduler(Vec<FrameCallback>);
        impl FrameScheduler for LeakyScheduler {
            fn request_frame(&mut self, callback: FrameCallback) -> FrameId {
                self.0.push(callback);
                self.0.len() as FrameId
            }
            fn cancel_frame(&mut self, _id: FrameId) {}
        }

        let mut scheduler = LeakyScheduler(Vec::new());
        let mut handle = AnimationHandle::new();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        handle.schedule_animation(&mut scheduler, move |_| counter.set(counter.get() + 1));
        handle.cancel_prior_animation(&mut scheduler);
        for callback in scheduler.0.drain(..) {
            callback(0.0);
        }
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn charts_do_not_cancel_each_other() {
        let mut scheduler = ManualScheduler::default();
        let mut left = AnimationHandle::new();
        let mut right = AnimationHandle::new();
        left.schedule_animation(&mut scheduler, |_| {});
        right.schedule_animation(&mut scheduler, |_| {});
        assert!(scheduler.cancelled.is_empty());
        assert_eq!(scheduler.queued.len(), 2);
    }
}
