use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub use game::*;
pub use tile::*;

mod game;
mod tile;

pub const TILE_QUEUE_CAPACITY: usize = 5;
pub const GAME_QUEUE_CAPACITY: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationTag {
    None,
    TileReveal,
    AddFlag,
    RemoveFlag,
    Win,
    Defeat,
    RetryButtonReveal,
    HideBoard,
    ShowBoard,
}

impl Default for AnimationTag {
    fn default() -> Self {
        Self::None
    }
}

/// One keyframe routine. `C` is whatever the routine writes to while it runs.
///
/// Skipping must leave the same end state as running to completion, so the
/// usual `skip` finishes the timer and calls `update` once.
pub trait Animation<C: ?Sized> {
    fn tag(&self) -> AnimationTag;

    fn update(&mut self, ctx: &mut C);

    fn skip(&mut self, ctx: &mut C);

    fn is_done(&self) -> bool;

    fn after_done(&mut self, _ctx: &mut C) {}
}

/// Bounded FIFO of animations. Only the head runs.
#[derive(Clone, Debug)]
pub struct AnimationQueue<A> {
    items: VecDeque<A>,
    capacity: usize,
}

impl<A> AnimationQueue<A> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.items.iter()
    }

    /// Appends `anim`. A full queue drops its oldest entry unfinished.
    pub fn enqueue(&mut self, anim: A) {
        if self.items.len() >= self.capacity {
            log::warn!("animation queue full at {}, dropping the oldest", self.capacity);
            self.items.pop_front();
        }
        self.items.push_back(anim);
    }

    /// Panics when the queue is empty.
    pub fn dequeue(&mut self) -> A {
        match self.items.pop_front() {
            Some(anim) => anim,
            None => panic!("dequeue on an empty animation queue"),
        }
    }

    /// Drops everything without running it.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Runs the head once; retires it when done.
    pub fn update<C: ?Sized>(&mut self, ctx: &mut C)
    where
        A: Animation<C>,
    {
        let Some(head) = self.items.front_mut() else {
            return;
        };
        head.update(ctx);
        if head.is_done() {
            let mut anim = self.dequeue();
            anim.after_done(ctx);
        }
    }

    /// Skips and retires every queued animation in order.
    pub fn skip_all<C: ?Sized>(&mut self, ctx: &mut C)
    where
        A: Animation<C>,
    {
        while let Some(mut anim) = self.items.pop_front() {
            anim.skip(ctx);
            anim.after_done(ctx);
        }
    }

    /// Skips from the head until one tagged with any of `tags` is reached.
    pub fn skip_until_tag<C: ?Sized>(&mut self, ctx: &mut C, tags: &[AnimationTag])
    where
        A: Animation<C>,
    {
        while let Some(head) = self.items.front() {
            if tags.contains(&head.tag()) {
                break;
            }
            let mut anim = self.dequeue();
            anim.skip(ctx);
            anim.after_done(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Timer;

    #[derive(Debug)]
    struct Count {
        tag: AnimationTag,
        timer: Timer,
    }

    #[derive(Debug, Default)]
    struct Log {
        updates: usize,
        finished: Vec<AnimationTag>,
    }

    impl Animation<Log> for Count {
        fn tag(&self) -> AnimationTag {
            self.tag
        }

        fn update(&mut self, log: &mut Log) {
            self.timer.tick_up(1.0);
            log.updates += 1;
        }

        fn skip(&mut self, log: &mut Log) {
            self.timer.finish();
            log.updates += 1;
        }

        fn is_done(&self) -> bool {
            self.timer.is_done()
        }

        fn after_done(&mut self, log: &mut Log) {
            log.finished.push(self.tag);
        }
    }

    fn count(tag: AnimationTag, ticks: f64) -> Count {
        Count {
            tag,
            timer: Timer::new(ticks),
        }
    }

    #[test]
    fn only_head_runs() {
        let mut queue = AnimationQueue::new(5);
        let mut log = Log::default();
        queue.enqueue(count(AnimationTag::TileReveal, 2.0));
        queue.enqueue(count(AnimationTag::AddFlag, 1.0));

        queue.update(&mut log);
        assert_eq!(queue.len(), 2);
        queue.update(&mut log);
        assert_eq!(log.finished, [AnimationTag::TileReveal]);
        queue.update(&mut log);
        assert!(queue.is_empty());
        assert_eq!(log.updates, 3);
    }

    #[test]
    fn skip_all_is_idempotent() {
        let mut queue = AnimationQueue::new(5);
        let mut log = Log::default();
        queue.enqueue(count(AnimationTag::Win, 10.0));
        queue.enqueue(count(AnimationTag::Win, 10.0));

        queue.skip_all(&mut log);
        assert!(queue.is_empty());
        assert_eq!(log.finished.len(), 2);

        queue.skip_all(&mut log);
        assert_eq!(log.finished.len(), 2);
    }

    #[test]
    fn skip_until_tag_stops_at_tag() {
        let mut queue = AnimationQueue::new(5);
        let mut log = Log::default();
        queue.enqueue(count(AnimationTag::Defeat, 10.0));
        queue.enqueue(count(AnimationTag::RetryButtonReveal, 10.0));
        queue.enqueue(count(AnimationTag::Defeat, 10.0));

        queue.skip_until_tag(&mut log, &[AnimationTag::RetryButtonReveal]);
        assert_eq!(queue.len(), 2);
        assert_eq!(log.finished, [AnimationTag::Defeat]);
    }

    #[test]
    fn overflow_drops_the_oldest() {
        let mut queue = AnimationQueue::new(2);
        queue.enqueue(count(AnimationTag::TileReveal, 1.0));
        queue.enqueue(count(AnimationTag::AddFlag, 1.0));
        queue.enqueue(count(AnimationTag::RemoveFlag, 1.0));

        assert_eq!(queue.len(), 2);
        let tags: Vec<_> = queue.iter().map(|anim| anim.tag).collect();
        assert_eq!(tags, [AnimationTag::AddFlag, AnimationTag::RemoveFlag]);
    }
}
