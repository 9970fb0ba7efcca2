use nalgebra::{Point3, Vector3};
use rand::Rng;

#[inline]
pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    nalgebra::distance(a, b)
}

/// Sum of the distances between every unordered pair of `points`.
pub fn pairwise_distance_sum(points: &[&Point3<f64>]) -> f64 {
    let mut total = 0.0;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            total += distance(a, b);
        }
    }
    total
}

/// Uniformly distributed vector inside the ball of radius `max_length`.
pub fn random_displacement<R: Rng + ?Sized>(rng: &mut R, max_length: f64) -> Vector3<f64> {
    if max_length <= 0.0 {
        return Vector3::zeros();
    }
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if v.norm_squared() <= 1.0 {
            return v * max_length;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pairwise_sum_of_a_right_triangle() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 0.0, 0.0);
        let c = Point3::new(0.0, 4.0, 0.0);
        assert!((pairwise_distance_sum(&[&a, &b, &c]) - 12.0).abs() < 1e-12);
        assert_eq!(pairwise_distance_sum(&[&a, &b]), 3.0);
        assert_eq!(pairwise_distance_sum(&[&a]), 0.0);
    }

    #[test]
    fn random_displacements_stay_within_the_ball() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(random_displacement(&mut rng, 0.5).norm() <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn zero_step_yields_no_displacement() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(random_displacement(&mut rng, 0.0), Vector3::zeros());
    }
}
