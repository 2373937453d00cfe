//! Test doubles: virtual time and a lamp board that checks the junction's
//! safety rules on every single lamp change.

#![allow(dead_code)]

use std::cell::RefCell;
use std::future::pending;
use std::rc::Rc;

use embassy_time::{Duration, Instant};
use pelican::{Clock, OutputLines};

pub const RED: [bool; 3] = [true, false, false];
pub const RED_AMBER: [bool; 3] = [true, true, false];
pub const GREEN: [bool; 3] = [false, false, true];
pub const AMBER: [bool; 3] = [false, true, false];

pub const RED_MAN: [bool; 2] = [true, false];
pub const GREEN_MAN: [bool; 2] = [false, true];
pub const DARK: [bool; 2] = [false, false];

/// Sleeping moves virtual time on and returns at once. Past `limit` the
/// clock stops dead: `sleep` never completes, which lets a test poll an
/// endless loop once and get control back.
pub struct SimClock {
    now: Instant,
    limit: Option<Instant>,
}

impl SimClock {
    pub fn new() -> Self {
        SimClock {
            now: Instant::from_ticks(0),
            limit: None,
        }
    }

    pub fn stopping_at(limit: Duration) -> Self {
        SimClock {
            now: Instant::from_ticks(0),
            limit: Some(Instant::from_ticks(0) + limit),
        }
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        self.now
    }

    async fn sleep(&mut self, duration: Duration) {
        if let Some(limit) = self.limit {
            if self.now + duration > limit {
                pending::<()>().await;
            }
        }
        self.now += duration;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Way(usize, [bool; 3]),
    Crossing([bool; 2]),
}

#[derive(Debug)]
pub struct Board {
    ways: Vec<[bool; 3]>,
    crossing: [bool; 2],
    pub events: Vec<Event>,
}

impl Board {
    pub fn new(ways: usize) -> Rc<RefCell<Board>> {
        Rc::new(RefCell::new(Board {
            ways: vec![RED; ways],
            crossing: RED_MAN,
            events: Vec::new(),
        }))
    }

    fn check(&self) {
        let moving = self
            .ways
            .iter()
            .filter(|lamps| **lamps == GREEN || **lamps == RED_AMBER)
            .count();
        assert!(moving <= 1, "more than one way going: {:?}", self.ways);

        if self.crossing != RED_MAN {
            assert!(
                self.ways.iter().all(|lamps| *lamps == RED),
                "pedestrians crossing while traffic moves: {:?}",
                self.ways
            );
        }
    }

    /// How many times the green man came on after a red man.
    pub fn crossings(&self) -> usize {
        let mut last = RED_MAN;
        let mut count = 0;
        for event in &self.events {
            if let Event::Crossing(lamps) = event {
                if last == RED_MAN && *lamps == GREEN_MAN {
                    count += 1;
                }
                last = *lamps;
            }
        }
        count
    }

    pub fn way_events(&self, index: usize) -> Vec<[bool; 3]> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Way(i, lamps) if *i == index => Some(*lamps),
                _ => None,
            })
            .collect()
    }
}

/// One head's lines, wired into a shared board.
pub struct Lamp {
    board: Rc<RefCell<Board>>,
    way: Option<usize>,
}

impl Lamp {
    pub fn way(board: &Rc<RefCell<Board>>, index: usize) -> Self {
        Lamp {
            board: Rc::clone(board),
            way: Some(index),
        }
    }

    pub fn crossing(board: &Rc<RefCell<Board>>) -> Self {
        Lamp {
            board: Rc::clone(board),
            way: None,
        }
    }
}

impl OutputLines<3> for Lamp {
    fn drive(&mut self, levels: [bool; 3]) {
        let index = self.way.expect("traffic lines on a crossing lamp");
        let mut board = self.board.borrow_mut();
        board.ways[index] = levels;
        board.events.push(Event::Way(index, levels));
        board.check();
    }
}

impl OutputLines<2> for Lamp {
    fn drive(&mut self, levels: [bool; 2]) {
        assert!(self.way.is_none(), "crossing lines on a traffic lamp");
        let mut board = self.board.borrow_mut();
        board.crossing = levels;
        board.events.push(Event::Crossing(levels));
        board.check();
    }
}

pub fn wire<const N: usize>(board: &Rc<RefCell<Board>>) -> [Lamp; N] {
    std::array::from_fn(|index| Lamp::way(board, index))
}
