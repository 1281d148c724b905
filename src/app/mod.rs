// Application layer: wires config, adapters and core stages into a ready-to-use resolver.

pub mod assistant;

pub use assistant::build_resolver;
