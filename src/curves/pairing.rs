//! The optimal ate pairing e: G1 × G2 → GT ⊂ Fp12*.
//!
//! Standard efficiency measures apply: G2 lives on the sextic M-twist,
//! line coefficients are precomputed per pairing input (`G2Prepared`),
//! several pairs share one Miller loop, and the final exponentiation
//! splits into the easy part (p⁶-1)(p²+1) and the hard part
//! (p⁴-p²+1)/q evaluated by a fixed addition chain in z.

use crate::biginteger::BitIterator;
use crate::curves::{G1Affine, G2Affine, G2Prepared, X, X_IS_NEGATIVE};
use crate::fields::{Field, Fq12, Fq2};

/// A G1 point admitted to the Miller loop; only its affine coordinates
/// are ever needed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct G1Prepared(pub G1Affine);

impl G1Prepared {
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn from_affine(p: G1Affine) -> Self {
        G1Prepared(p)
    }
}

impl From<G1Affine> for G1Prepared {
    fn from(p: G1Affine) -> Self {
        G1Prepared(p)
    }
}

// Evaluate the line with the given coefficients at p and fold it into f.
fn ell(f: &mut Fq12, coeffs: &(Fq2, Fq2, Fq2), p: &G1Affine) {
    let c0 = coeffs.0;
    let mut c1 = coeffs.1;
    let mut c2 = coeffs.2;

    c2.mul_by_fp(&p.y);
    c1.mul_by_fp(&p.x);
    f.mul_by_014(&c0, &c1, &c2);
}

fn exp_by_x(f: Fq12) -> Fq12 {
    let mut f = f.cyclotomic_exp(X);
    if X_IS_NEGATIVE {
        f.conjugate();
    }
    f
}

/// One shared Miller loop over any number of prepared pairs. Pairs with
/// an infinity on either side contribute nothing.
pub fn miller_loop<'a, I>(i: I) -> Fq12
where
    I: IntoIterator<Item = &'a (G1Prepared, G2Prepared)>,
{
    let mut pairs = vec![];
    for (p, q) in i {
        if !p.is_zero() && !q.is_zero() {
            pairs.push((p, q.ell_coeffs.iter()));
        }
    }

    let mut f = Fq12::one();

    for i in BitIterator::new(X).skip(1) {
        f = f.square();

        for (p, coeffs) in pairs.iter_mut() {
            ell(&mut f, coeffs.next().unwrap(), &p.0);
        }

        if i {
            for (p, coeffs) in pairs.iter_mut() {
                ell(&mut f, coeffs.next().unwrap(), &p.0);
            }
        }
    }

    if X_IS_NEGATIVE {
        f.conjugate();
    }

    f
}

/// Raise a Miller-loop output to (p¹² - 1)/q; `None` only for zero input.
pub fn final_exponentiation(f: &Fq12) -> Option<Fq12> {
    // Following https://eprint.iacr.org/2016/130.pdf, Table 1.

    // f1 = f^(p^6), the conjugate.
    let mut f1 = *f;
    f1.conjugate();

    f.inverse().map(|mut f2| {
        // r = f^(p^6 - 1)
        let mut r = f1 * f2;
        f2 = r;
        // r = f^((p^6 - 1)(p^2 + 1)); the cyclotomic subgroup from here on.
        r.frobenius_map(2);
        r *= f2;

        // Hard part, fixed addition chain in z.
        let mut y0 = r.cyclotomic_square();
        y0.conjugate();

        let mut y5 = exp_by_x(r);

        let mut y1 = y5.cyclotomic_square();
        let mut y3 = y0 * y5;
        y0 = exp_by_x(y3);
        let y2 = exp_by_x(y0);
        let mut y4 = exp_by_x(y2);
        y4 *= y1;
        y1 = exp_by_x(y4);
        y3.conjugate();
        y1 *= y3;
        y1 *= r;
        y3 = r;
        y3.conjugate();
        y0 *= r;
        y0.frobenius_map(3);
        y4 *= y3;
        y4.frobenius_map(1);
        y5 *= y2;
        y5.frobenius_map(2);
        y5 *= y0;
        y5 *= y4;
        y5 *= y1;
        y5
    })
}

/// The full pairing of a single pair.
pub fn pairing(p: G1Affine, q: G2Affine) -> Fq12 {
    let pairs = [(G1Prepared::from(p), G2Prepared::from(q))];
    // The Miller loop never outputs zero for curve points.
    final_exponentiation(&miller_loop(pairs.iter())).unwrap()
}

/// ∏ e(P_i, Q_i) with one Miller loop and one final exponentiation.
pub fn product_of_pairings(pairs: &[(G1Prepared, G2Prepared)]) -> Option<Fq12> {
    final_exponentiation(&miller_loop(pairs.iter()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{fr, Fr};
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    fn g1() -> G1Affine {
        G1Affine::prime_subgroup_generator()
    }

    fn g2() -> G2Affine {
        G2Affine::prime_subgroup_generator()
    }

    #[test]
    fn nondegeneracy() {
        let e = pairing(g1(), g2());
        assert_ne!(e, Fq12::one());
        assert!(!e.is_zero());
    }

    #[test]
    fn pairing_output_has_order_dividing_q() {
        let e = pairing(g1(), g2());
        assert_eq!(e.pow(fr::MODULUS), Fq12::one());
    }

    #[test]
    fn bilinearity() {
        let mut rng = XorShiftRng::seed_from_u64(61);
        for _ in 0..3 {
            let a: Fr = rng.gen();
            let b: Fr = rng.gen();

            let pa = (g1() * a).into_affine();
            let qb = (g2() * b).into_affine();

            let lhs = pairing(pa, qb);
            let rhs = pairing(g1(), g2()).pow((a * b).into_repr());
            assert_eq!(lhs, rhs);

            // Shifting the scalar between the slots changes nothing.
            assert_eq!(pairing(pa, g2()).pow(b.into_repr()), lhs);
        }
    }

    #[test]
    fn infinity_pairs_to_one() {
        assert_eq!(pairing(G1Affine::zero(), g2()), Fq12::one());
        assert_eq!(pairing(g1(), G2Affine::zero()), Fq12::one());
    }

    #[test]
    fn product_of_inverse_pairs_is_one() {
        let mut rng = XorShiftRng::seed_from_u64(62);
        let a: Fr = rng.gen();
        let p = (g1() * a).into_affine();
        let pairs = [
            (G1Prepared::from(p), G2Prepared::from(g2())),
            (G1Prepared::from(-p), G2Prepared::from(g2())),
        ];
        assert_eq!(product_of_pairings(&pairs), Some(Fq12::one()));
    }

    #[test]
    fn product_matches_pairwise_product() {
        let mut rng = XorShiftRng::seed_from_u64(63);
        let a: Fr = rng.gen();
        let b: Fr = rng.gen();
        let pa = (g1() * a).into_affine();
        let qb = (g2() * b).into_affine();

        let pairs = [
            (G1Prepared::from(pa), G2Prepared::from(g2())),
            (G1Prepared::from(g1()), G2Prepared::from(qb)),
        ];
        let joint = product_of_pairings(&pairs).unwrap();
        let split = pairing(pa, g2()) * pairing(g1(), qb);
        assert_eq!(joint, split);
    }

    #[test]
    fn final_exponentiation_of_zero_is_none() {
        assert_eq!(final_exponentiation(&Fq12::zero()), None);
    }
}
