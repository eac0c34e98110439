#![warn(unused_extern_crates)]
#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]
pub mod ars;
pub mod dist;
mod ext;
pub mod integrate;
pub mod mh;

pub use ext::ExtF64;
pub use iagm_consts::rv;

pub use rand;
