/// Derivative of samples spaced `dt` apart.
pub fn gradient_uniform(values: &[f64], dt: f64) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = Vec::with_capacity(n);
    out.push((values[1] - values[0]) / dt);
    for i in 1..n - 1 {
        out.push((values[i + 1] - values[i - 1]) / (2.0 * dt));
    }
    out.push((values[n - 1] - values[n - 2]) / dt);
    out
}

/// Derivative of `values` with respect to the (possibly irregular) `coords`.
///
/// Interior samples use the second-order non-uniform stencil. Zero-width
/// spacings fall back to the widest available difference, or 0 when the whole
/// neighbourhood collapses onto one timestamp.
pub fn gradient(values: &[f64], coords: &[f64]) -> Vec<f64> {
    let n = values.len().min(coords.len());
    if n < 2 {
        return vec![0.0; n];
    }
    let slope = |i: usize, j: usize| {
        let span = coords[j] - coords[i];
        if span > 0.0 {
            (values[j] - values[i]) / span
        } else {
            0.0
        }
    };

    let mut out = Vec::with_capacity(n);
    out.push(slope(0, 1));
    for i in 1..n - 1 {
        let h1 = coords[i] - coords[i - 1];
        let h2 = coords[i + 1] - coords[i];
        if h1 > 0.0 && h2 > 0.0 {
            let a = -h2 / (h1 * (h1 + h2));
            let b = (h2 - h1) / (h1 * h2);
            let c = h1 / (h2 * (h1 + h2));
            out.push(a * values[i - 1] + b * values[i] + c * values[i + 1]);
        } else {
            out.push(slope(i - 1, i + 1));
        }
    }
    out.push(slope(n - 2, n - 1));
    out
}
