pub mod blur;
pub mod center_bias;
pub mod density;
pub mod likelihood;
pub mod nonlinearity;

pub use self::blur::Blur;
pub use self::center_bias::CenterBias;
pub use self::density::LogDensity;
pub use self::likelihood::AverageLogLikelihood;
pub use self::nonlinearity::Nonlinearity;
