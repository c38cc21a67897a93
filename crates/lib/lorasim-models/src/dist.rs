use rand_distr::{Distribution, Exp, Gamma, LogNormal, Normal, Uniform};
use rand_pcg::Pcg64Mcg;
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
pub enum DistType {
    Constant(f64),
    Uniform(Uniform<f64>),
    Normal(Normal<f64>),
    LogNormal(LogNormal<f64>),
    Exponential(Exp<f64>),
    Gamma(Gamma<f64>),
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Deserialize)]
pub struct DistParams {
    pub dist_name: String,
    pub seed: Option<u64>,
    pub value: Option<f64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub scale: Option<f64>,
    pub shape: Option<f64>,
    pub rate: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DistType {
    pub fn new(params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        match params.dist_name.to_lowercase().as_str() {
            "constant" => Self::build_constant(params),
            "uniform" => Self::build_uniform(params),
            "normal" => Self::build_normal(params),
            "lognormal" => Self::build_log_normal(params),
            "exponential" => Self::build_exponential(params),
            "gamma" => Self::build_gamma(params),
            _ => Err(format!(
                "Invalid distribution name {}. Supported values are: \
                 constant, uniform, normal, lognormal, exponential, gamma",
                params.dist_name
            )
            .into()),
        }
    }

    fn build_constant(dist_params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let value = dist_params.value.ok_or("Missing value")?;
        Ok(Self::Constant(value))
    }

    fn build_uniform(dist_params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let min = dist_params.min.ok_or("Missing min")?;
        let max = dist_params.max.ok_or("Missing max")?;
        if min >= max {
            return Err("Uniform distribution needs min < max".into());
        }
        Ok(Self::Uniform(Uniform::new(min, max)))
    }

    fn build_normal(dist_params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let mean = dist_params.mean.ok_or("Missing mean")?;
        let std_dev = dist_params.std_dev.ok_or("Missing std_dev")?;
        Ok(Self::Normal(Normal::new(mean, std_dev)?))
    }

    fn build_log_normal(dist_params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let mean = dist_params.mean.ok_or("Missing mean")?;
        let std_dev = dist_params.std_dev.ok_or("Missing std_dev")?;
        Ok(Self::LogNormal(LogNormal::new(mean, std_dev)?))
    }

    fn build_exponential(dist_params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let rate = dist_params.rate.ok_or("Missing rate")?;
        Ok(Self::Exponential(Exp::new(rate)?))
    }

    fn build_gamma(dist_params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let shape = dist_params.shape.ok_or("Missing shape")?;
        let scale = dist_params.scale.ok_or("Missing scale")?;
        Ok(Self::Gamma(Gamma::new(shape, scale)?))
    }
}

#[derive(Debug, Clone)]
pub struct RngSampler {
    pub dist: DistType,
    pub rng: Pcg64Mcg,
}

impl RngSampler {
    pub fn new(params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let seed: u128 = params.seed.unwrap_or(0) as u128;
        let dist = DistType::new(params)?;
        Ok(Self {
            dist,
            rng: Pcg64Mcg::new(seed),
        })
    }

    /// Replaces the seed of the configuration, e.g. to give each device its own stream.
    pub fn with_seed(params: &DistParams, seed: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let mut sampler = Self::new(params)?;
        sampler.rng = Pcg64Mcg::new(seed as u128);
        Ok(sampler)
    }

    pub fn sample(&mut self) -> f64 {
        match self.dist {
            DistType::Constant(value) => value,
            DistType::Uniform(ref mut dist) => dist.sample(&mut self.rng),
            DistType::Normal(ref mut dist) => dist.sample(&mut self.rng),
            DistType::LogNormal(ref mut dist) => dist.sample(&mut self.rng),
            DistType::Exponential(ref mut dist) => dist.sample(&mut self.rng),
            DistType::Gamma(ref mut dist) => dist.sample(&mut self.rng),
        }
    }
}
