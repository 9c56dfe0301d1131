use crate::correlation_models::{CorrelationModel, SquaredExponentialCorr};
use crate::errors::{GpError, Result};
use linfa::{Float, ParamGuard};

/// A set of validated GP hyperparameters.
#[derive(Clone, Debug, PartialEq)]
pub struct GpValidParams<F: Float, Corr: CorrelationModel<F> = SquaredExponentialCorr> {
    /// Kernel bandwidth, used as is in `exp(-|x - y|^2 / (2 * sigma))`
    pub(crate) sigma: F,
    /// Observation noise added to the diagonal of the active set system matrix
    pub(crate) beta: F,
    /// Correlation model k(x, x')
    pub(crate) corr: Corr,
}

impl<F: Float, Corr: CorrelationModel<F>> Default for GpValidParams<F, Corr> {
    fn default() -> GpValidParams<F, Corr> {
        GpValidParams {
            sigma: F::one(),
            beta: F::zero(),
            corr: Corr::default(),
        }
    }
}

impl<F: Float, Corr: CorrelationModel<F>> GpValidParams<F, Corr> {
    /// Get kernel bandwidth
    pub fn sigma(&self) -> F {
        self.sigma
    }

    /// Get observation noise
    pub fn beta(&self) -> F {
        self.beta
    }

    /// Get correlation model k(x, x')
    pub fn corr(&self) -> &Corr {
        &self.corr
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified to build an
/// [active set](crate::ActiveSet).
pub struct GpParams<F: Float, Corr: CorrelationModel<F> = SquaredExponentialCorr>(
    GpValidParams<F, Corr>,
);

impl<F: Float, Corr: CorrelationModel<F>> GpParams<F, Corr> {
    /// A constructor for GP hyperparameters given the kernel bandwidth and the noise
    pub fn new(sigma: F, beta: F) -> GpParams<F, Corr> {
        Self(GpValidParams {
            sigma,
            beta,
            ..Default::default()
        })
    }

    /// Set kernel bandwidth.
    pub fn sigma(mut self, sigma: F) -> Self {
        self.0.sigma = sigma;
        self
    }

    /// Set observation noise.
    ///
    /// The noise is added to the diagonal of the kernel matrix when solving for alpha.
    pub fn beta(mut self, beta: F) -> Self {
        self.0.beta = beta;
        self
    }

    /// Set correlation model.
    pub fn corr(mut self, corr: Corr) -> Self {
        self.0.corr = corr;
        self
    }
}

impl<F: Float, Corr: CorrelationModel<F>> From<GpValidParams<F, Corr>> for GpParams<F, Corr> {
    fn from(valid: GpValidParams<F, Corr>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float, Corr: CorrelationModel<F>> ParamGuard for GpParams<F, Corr> {
    type Checked = GpValidParams<F, Corr>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if !(self.0.sigma.is_finite() && self.0.sigma > F::zero()) {
            return Err(GpError::InvalidValueError(format!(
                "`sigma` should be a strictly positive finite value, got {}",
                self.0.sigma
            )));
        }
        if !(self.0.beta.is_finite() && self.0.beta >= F::zero()) {
            return Err(GpError::InvalidValueError(format!(
                "`beta` should be a positive finite value, got {}",
                self.0.beta
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
