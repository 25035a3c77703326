pub mod cell;

pub mod context;

pub mod item;

pub mod processor;

pub mod step;
