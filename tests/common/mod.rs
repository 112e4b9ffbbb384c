pub mod synthetic_signal;
