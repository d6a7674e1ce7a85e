//! End-to-end tests that drive the engine with a scripted process runner
//! instead of real tools.
#![cfg(test)]

mod support;

mod scanner {
    mod integration;
}

mod session {
    mod integration;
}
