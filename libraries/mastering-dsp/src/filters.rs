//! Butterworth filter design and second-order-section filtering
//!
//! Designs are digital Butterworth filters obtained from the analog
//! prototype through frequency transformation and the bilinear transform
//! (pre-warped), then factored into a cascade of biquad sections. Filters
//! are stateless: every call to [`SosFilter::apply`] starts from zero state,
//! so a filter value can be shared between channels, chunks and threads.
//!
//! All coefficient maths is done in f64; samples stay f32 at the edges.
use crate::error::{DspError, Result};
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// Upper clamp for normalized frequencies (1.0 = Nyquist)
pub const MAX_NORMALIZED_FREQ: f64 = 0.999_999;

/// Lower clamp for normalized frequencies
pub const MIN_NORMALIZED_FREQ: f64 = 1e-6;

/// Amount a collapsed band-pass upper edge is pushed above the lower edge
pub const BAND_EDGE_NUDGE: f64 = 1e-9;

/// Band-pass prototype order used by [`design_peak`]
pub const PEAK_ORDER: usize = 2;

// Sample rate of the normalized design domain (Nyquist = 1.0)
const DESIGN_FS: f64 = 2.0;

// Poles with |imag| below this are treated as real when pairing sections
const REAL_POLE_TOLERANCE: f64 = 1e-12;

/// Response type of a Butterworth design
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Lowpass,
    Highpass,
    Bandpass,
}

/// One biquad section, `a0` normalized to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Complex response at `z^-1 = e^{-jw}`
    fn response(&self, z1: Complex64) -> Complex64 {
        let z2 = z1 * z1;
        (self.b0 + z1 * self.b1 + z2 * self.b2) / (1.0 + z1 * self.a1 + z2 * self.a2)
    }
}

/// Cascade of biquad sections
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// Wrap precomputed sections
    pub fn from_sections(sections: Vec<Biquad>) -> Self {
        Self { sections }
    }

    /// The biquad sections, in processing order
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Filter one channel into a new buffer
    pub fn apply(&self, samples: &[f32]) -> Vec<f32> {
        let mut out = samples.to_vec();
        self.apply_in_place(&mut out);
        out
    }

    /// Filter one channel in place (direct form II transposed)
    pub fn apply_in_place(&self, samples: &mut [f32]) {
        let mut state = vec![[0.0_f64; 2]; self.sections.len()];

        for sample in samples.iter_mut() {
            let mut x = f64::from(*sample);
            for (s, z) in self.sections.iter().zip(state.iter_mut()) {
                let y = s.b0 * x + z[0];
                z[0] = s.b1 * x - s.a1 * y + z[1];
                z[1] = s.b2 * x - s.a2 * y;
                x = y;
            }
            *sample = x as f32;
        }
    }

    /// Magnitude response at `frequency_hz`
    pub fn magnitude_at(&self, frequency_hz: f64, sample_rate: u32) -> f64 {
        let w = 2.0 * PI * frequency_hz / f64::from(sample_rate);
        let z1 = Complex64::from_polar(1.0, -w);
        self.sections
            .iter()
            .map(|s| s.response(z1))
            .fold(Complex64::new(1.0, 0.0), |acc, h| acc * h)
            .norm()
    }
}

/// Design a Butterworth low-pass filter
pub fn design_lowpass(sample_rate: u32, cutoff_hz: f64, order: usize) -> Result<SosFilter> {
    let wn = normalize(sample_rate, cutoff_hz)?;
    butterworth(order, FilterType::Lowpass, wn, wn)
}

/// Design a Butterworth high-pass filter
pub fn design_highpass(sample_rate: u32, cutoff_hz: f64, order: usize) -> Result<SosFilter> {
    let wn = normalize(sample_rate, cutoff_hz)?;
    butterworth(order, FilterType::Highpass, wn, wn)
}

/// Design a Butterworth band-pass filter (`2 * order` poles)
///
/// Edges are clamped below Nyquist. A collapsed band (low >= high) is
/// kept non-empty by nudging the upper edge up by [`BAND_EDGE_NUDGE`].
pub fn design_bandpass(
    sample_rate: u32,
    low_hz: f64,
    high_hz: f64,
    order: usize,
) -> Result<SosFilter> {
    let a = normalize(sample_rate, low_hz)?;
    let b = normalize(sample_rate, high_hz)?;
    let mut low = a.min(b);
    let mut high = a.max(b);

    if low >= high {
        high = low + BAND_EDGE_NUDGE;
    }
    if high >= 1.0 {
        high = MAX_NORMALIZED_FREQ;
    }
    // Both edges pinned at the top: open the band downwards instead
    if low >= high {
        low = high - BAND_EDGE_NUDGE;
    }

    butterworth(order, FilterType::Bandpass, low, high)
}

/// Side of the corner frequency a blended shelf acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfKind {
    /// Below the corner (low-pass)
    Low,
    /// Above the corner (high-pass)
    High,
}

/// Design the filter a shelf is blended with
///
/// A low shelf blends a Butterworth low-pass, a high shelf a high-pass.
pub fn design_shelf(
    sample_rate: u32,
    cutoff_hz: f64,
    order: usize,
    kind: ShelfKind,
) -> Result<SosFilter> {
    match kind {
        ShelfKind::Low => design_lowpass(sample_rate, cutoff_hz, order),
        ShelfKind::High => design_highpass(sample_rate, cutoff_hz, order),
    }
}

/// Design the band-pass a bell is blended with
///
/// Edges sit at `center / sqrt(q)` and `center * sqrt(q)`. At `q = 1` they
/// coincide and the band is nudged open (see [`design_bandpass`]).
pub fn design_peak(sample_rate: u32, center_hz: f64, q: f64) -> Result<SosFilter> {
    if !(q.is_finite() && q > 0.0) {
        return Err(DspError::InvalidDesign(format!(
            "peak Q must be positive, got {}",
            q
        )));
    }
    let root_q = q.sqrt();
    design_bandpass(sample_rate, center_hz / root_q, center_hz * root_q, PEAK_ORDER)
}

/// Normalize a frequency to Nyquist and clamp it into (0, 1)
fn normalize(sample_rate: u32, frequency_hz: f64) -> Result<f64> {
    if sample_rate == 0 {
        return Err(DspError::InvalidDesign("sample rate must be non-zero".into()));
    }
    if !frequency_hz.is_finite() {
        return Err(DspError::InvalidDesign(format!(
            "frequency must be finite, got {}",
            frequency_hz
        )));
    }
    let nyquist = f64::from(sample_rate) / 2.0;
    Ok((frequency_hz / nyquist).clamp(MIN_NORMALIZED_FREQ, MAX_NORMALIZED_FREQ))
}

/// Zeros, poles and gain of a filter
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

fn butterworth(order: usize, kind: FilterType, low: f64, high: f64) -> Result<SosFilter> {
    if order == 0 {
        return Err(DspError::InvalidDesign("filter order must be at least 1".into()));
    }

    let prototype = analog_prototype(order);
    let analog = match kind {
        FilterType::Lowpass => lowpass_to_lowpass(prototype, prewarp(low)),
        FilterType::Highpass => lowpass_to_highpass(prototype, prewarp(low)),
        FilterType::Bandpass => {
            let w1 = prewarp(low);
            let w2 = prewarp(high);
            lowpass_to_bandpass(prototype, (w1 * w2).sqrt(), w2 - w1)
        }
    };

    let sections = into_sections(bilinear(analog));
    if sections
        .iter()
        .any(|s| ![s.b0, s.b1, s.b2, s.a1, s.a2].iter().all(|c| c.is_finite()))
    {
        return Err(DspError::InvalidDesign(format!(
            "{:?} design of order {} produced non-finite coefficients",
            kind, order
        )));
    }
    Ok(SosFilter::from_sections(sections))
}

/// Analog Butterworth prototype: unit cutoff, poles on the left half circle
fn analog_prototype(order: usize) -> Zpk {
    let n = order as f64;
    let poles = (0..order)
        .map(|i| {
            let m = 2.0 * i as f64 - n + 1.0;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();
    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

fn prewarp(wn: f64) -> f64 {
    2.0 * DESIGN_FS * (PI * wn / DESIGN_FS).tan()
}

fn lowpass_to_lowpass(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.poles.len() - zpk.zeros.len();
    Zpk {
        zeros: zpk.zeros.iter().map(|z| *z * wo).collect(),
        poles: zpk.poles.iter().map(|p| *p * wo).collect(),
        gain: zpk.gain * wo.powi(degree as i32),
    }
}

fn lowpass_to_highpass(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.poles.len() - zpk.zeros.len();
    let num: Complex64 = zpk.zeros.iter().map(|z| -*z).product();
    let den: Complex64 = zpk.poles.iter().map(|p| -*p).product();

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|z| wo / *z).collect();
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: zpk.poles.iter().map(|p| wo / *p).collect(),
        gain: zpk.gain * (num / den).re,
    }
}

fn lowpass_to_bandpass(zpk: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = zpk.poles.len() - zpk.zeros.len();
    let split = |roots: &[Complex64]| -> Vec<Complex64> {
        let scaled: Vec<Complex64> = roots.iter().map(|r| *r * (bw / 2.0)).collect();
        let offsets: Vec<Complex64> = scaled.iter().map(|r| (*r * *r - wo * wo).sqrt()).collect();
        scaled
            .iter()
            .zip(&offsets)
            .map(|(r, d)| *r + *d)
            .chain(scaled.iter().zip(&offsets).map(|(r, d)| *r - *d))
            .collect()
    };

    let mut zeros = split(&zpk.zeros);
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: split(&zpk.poles),
        gain: zpk.gain * bw.powi(degree as i32),
    }
}

/// Bilinear transform; zeros at infinity land on z = -1
fn bilinear(zpk: Zpk) -> Zpk {
    let fs2 = Complex64::new(2.0 * DESIGN_FS, 0.0);
    let degree = zpk.poles.len() - zpk.zeros.len();

    let num: Complex64 = zpk.zeros.iter().map(|z| fs2 - *z).product();
    let den: Complex64 = zpk.poles.iter().map(|p| fs2 - *p).product();

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|z| (fs2 + *z) / (fs2 - *z)).collect();
    zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: zpk.poles.iter().map(|p| (fs2 + *p) / (fs2 - *p)).collect(),
        gain: zpk.gain * (num / den).re,
    }
}

/// Polynomial `1 + c1 z^-1 + c2 z^-2` built from a root pair or a single root
#[derive(Clone, Copy)]
struct Factor {
    c1: f64,
    c2: f64,
    first_order: bool,
    radius: f64,
}

impl Factor {
    fn conjugate_pair(root: Complex64) -> Self {
        Self {
            c1: -2.0 * root.re,
            c2: root.norm_sqr(),
            first_order: false,
            radius: root.norm(),
        }
    }

    fn real_pair(a: f64, b: f64) -> Self {
        Self {
            c1: -(a + b),
            c2: a * b,
            first_order: false,
            radius: a.abs().max(b.abs()),
        }
    }

    fn single(a: f64) -> Self {
        Self {
            c1: -a,
            c2: 0.0,
            first_order: true,
            radius: a.abs(),
        }
    }
}

/// Group conjugate roots into second-order factors
///
/// Real roots are sorted and paired outside-in, so a band-pass puts one
/// zero at DC and one at Nyquist in every section.
fn factor_roots(roots: &[Complex64]) -> Vec<Factor> {
    let mut factors: Vec<Factor> = roots
        .iter()
        .filter(|r| r.im > REAL_POLE_TOLERANCE)
        .map(|r| Factor::conjugate_pair(*r))
        .collect();

    let mut reals: Vec<f64> = roots
        .iter()
        .filter(|r| r.im.abs() <= REAL_POLE_TOLERANCE)
        .map(|r| r.re)
        .collect();
    reals.sort_by(|a, b| a.total_cmp(b));

    let (mut lo, mut hi) = (0, reals.len());
    while hi - lo >= 2 {
        factors.push(Factor::real_pair(reals[lo], reals[hi - 1]));
        lo += 1;
        hi -= 1;
    }
    if hi - lo == 1 {
        factors.push(Factor::single(reals[lo]));
    }
    factors
}

fn into_sections(zpk: Zpk) -> Vec<Biquad> {
    let mut pole_factors = factor_roots(&zpk.poles);
    let zero_factors = factor_roots(&zpk.zeros);

    // Lowest-Q sections first, the first-order section (odd orders) ahead of all
    pole_factors.sort_by(|a, b| {
        b.first_order
            .cmp(&a.first_order)
            .then(a.radius.total_cmp(&b.radius))
    });

    let mut second_order_zeros = zero_factors.iter().filter(|f| !f.first_order);
    let mut first_order_zeros = zero_factors.iter().filter(|f| f.first_order);

    let mut sections: Vec<Biquad> = pole_factors
        .iter()
        .map(|pole| {
            let zero = if pole.first_order {
                first_order_zeros.next()
            } else {
                second_order_zeros.next()
            };
            let (c1, c2) = zero.map_or((0.0, 0.0), |z| (z.c1, z.c2));
            Biquad {
                b0: 1.0,
                b1: c1,
                b2: c2,
                a1: pole.c1,
                a2: pole.c2,
            }
        })
        .collect();

    if let Some(first) = sections.first_mut() {
        first.b0 *= zpk.gain;
        first.b1 *= zpk.gain;
        first.b2 *= zpk.gain;
    }
    sections
}
