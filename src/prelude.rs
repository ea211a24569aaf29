pub use crate::galaxy::{
    GalaxyError, GalaxyParams, ParamsPath, ParticleBuffer, ParticleCount, DEFAULT_PARAMS_PATH,
};
