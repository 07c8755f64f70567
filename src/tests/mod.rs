//! gnss-tec lib test modules

mod obs;
