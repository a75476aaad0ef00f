extern crate conv;
extern crate flate2;
extern crate fnv;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate nalgebra;
extern crate num;
#[macro_use]
extern crate quick_error;
extern crate regex;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_yaml;
extern crate wigner_symbols;
extern crate xz2;

#[macro_use]
mod macros;

pub mod ang_mom;
pub mod conf;
pub mod error;
pub mod guards;
pub mod io;
pub mod job;
pub mod linalg;
pub mod op_sum;
pub mod radial;
pub mod scale;
pub mod show;
pub mod so5cg;
pub mod special;
pub mod spherical;
pub mod utils;
pub mod xspace;
