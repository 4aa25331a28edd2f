//! Behavioural test suites for the xross dispatcher.

mod dispatch_behaviour;
