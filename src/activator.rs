//! Activation function types.

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
///
/// Every variant is a stateless scalar transform, so a single value can be
/// shared by any number of nodes.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub enum Activator {
    /// Passes its input through unchanged
    Identity,
    /// Rectified Linear Unit
    ReLU,
    /// Leaky Rectified Linear Unit
    ///
    /// Takes an `alpha` value to use for negative inputs.
    LeakyReLU(f64),
    /// Sigmoid function
    Sigmoid,
    /// Hyperbolic tan function
    TanH,
    /// Any caller supplied function
    #[serde(skip)]
    Custom(fn(f64) -> f64),
}

impl Activator {
    /// Evaluates `f(x)` for the selected the activation function.
    pub fn f(&self, x: f64) -> f64 {
        match *self {
            Activator::Identity => x,
            Activator::ReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            Activator::LeakyReLU(alpha) => {
                if x > 0.0 {
                    x
                } else {
                    alpha * x
                }
            }
            Activator::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activator::TanH => x.tanh(),
            Activator::Custom(f) => f(x),
        }
    }
}

impl Default for Activator {
    fn default() -> Self {
        Activator::Identity
    }
}

impl From<fn(f64) -> f64> for Activator {
    fn from(f: fn(f64) -> f64) -> Self {
        Activator::Custom(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn builtin_functions() {
        assert_eq!(Activator::Identity.f(-3.5), -3.5);
        assert_eq!(Activator::ReLU.f(-1.0), 0.0);
        assert_eq!(Activator::ReLU.f(2.0), 2.0);
        assert_eq!(Activator::LeakyReLU(0.1).f(-2.0), -0.2);
        assert_abs_diff_eq!(Activator::Sigmoid.f(0.0), 0.5);
        assert_abs_diff_eq!(Activator::TanH.f(1.0), 0.7615941559557649, epsilon = 1e-12);
    }

    #[test]
    fn custom_function() {
        fn square(x: f64) -> f64 {
            x * x
        }
        let activator = Activator::from(square as fn(f64) -> f64);
        assert_eq!(activator.f(3.0), 9.0);
    }

    #[test]
    fn nan_propagates() {
        assert!(Activator::Identity.f(f64::NAN).is_nan());
        assert!(Activator::Sigmoid.f(f64::NAN).is_nan());
    }
}
