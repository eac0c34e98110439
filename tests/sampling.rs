use iagm::rv::traits::Rv;
use iagm::stats::dist::gaussian;
use iagm::utils::{Matrix, Shape, Tensor3};
use iagm::{
    draw_alpha, draw_beta_ars, draw_indicator, draw_posterior_z,
    integral_approx, sample_delta_a, sample_delta_b, sample_mu_jk,
    sample_s_ljk, sample_s_rjk, seeded_rng, AgdParams, Hyperpriors,
    IntegralConfig, MhConfig, PriorRatio, Site,
};
use rand_xoshiro::Xoshiro256Plus;

const N_PER_CLUSTER: usize = 30;
const N_FEATURES: usize = 2;
const N_COMPONENTS: usize = 2;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two well-separated clusters in two dimensions
fn two_clusters(rng: &mut Xoshiro256Plus) -> Matrix<f64> {
    let lo = gaussian(-3.0, 0.5).unwrap();
    let hi = gaussian(3.0, 0.5).unwrap();
    let rows = (0..2 * N_PER_CLUSTER)
        .map(|i| {
            let g = if i < N_PER_CLUSTER { &lo } else { &hi };
            let row: Vec<f64> = g.sample(N_FEATURES, rng);
            row
        })
        .collect();
    Matrix::from_vecs(rows)
}

fn init_params() -> AgdParams {
    AgdParams {
        mu: Matrix::from_vecs(vec![vec![-1.0, -1.0], vec![1.0, 1.0]]),
        s_l: Matrix::filled(N_COMPONENTS, N_FEATURES, 1.0),
        s_r: Matrix::filled(N_COMPONENTS, N_FEATURES, 1.0),
        mu_irr: Matrix::filled(N_COMPONENTS, N_FEATURES, 0.0),
        s_l_irr: Matrix::filled(N_COMPONENTS, N_FEATURES, 0.1),
        s_r_irr: Matrix::filled(N_COMPONENTS, N_FEATURES, 0.1),
        rho: Matrix::filled(N_COMPONENTS, N_FEATURES, 0.5),
    }
}

/// Normalize the responsibilities of each observation to sum to one over
/// components and features
fn normalize(z: &Tensor3) -> Tensor3 {
    let (n, m, d) = z.dims();
    let totals: Vec<f64> = (0..n)
        .map(|i| {
            (0..m)
                .flat_map(|j| (0..d).map(move |k| (j, k)))
                .map(|(j, k)| z[(i, j, k)])
                .sum()
        })
        .collect();
    Tensor3::from_fn(n, m, d, |i, j, k| {
        if totals[i] > 0.0 {
            z[(i, j, k)] / totals[i]
        } else {
            0.0
        }
    })
}

/// One Gibbs sweep over every component parameter and hyperparameter
fn sweep(
    x: &Matrix<f64>,
    params: &mut AgdParams,
    delta_a: &mut [f64],
    delta_b: &mut [f64],
    hyper: &Hyperpriors,
    config: &MhConfig,
    rng: &mut Xoshiro256Plus,
) -> Vec<usize> {
    let pi = vec![1.0 / N_COMPONENTS as f64; N_COMPONENTS];
    let z = normalize(&draw_posterior_z(x, &pi, params).unwrap());

    for j in 0..N_COMPONENTS {
        for k in 0..N_FEATURES {
            let site = Site::new(x, &z, j, k).unwrap();
            let (mu, s_l, s_r) =
                (params.mu[(j, k)], params.s_l[(j, k)], params.s_r[(j, k)]);

            let mu = sample_mu_jk(
                &site, mu, s_l, s_r, &hyper.lam, &hyper.r, config, rng,
            )
            .unwrap()
            .x;
            let s_l = sample_s_ljk(
                &site,
                mu,
                s_l,
                s_r,
                &hyper.beta_l,
                &hyper.w_l,
                config,
                rng,
            )
            .unwrap()
            .x;
            let s_r = sample_s_rjk(
                &site,
                mu,
                s_l,
                s_r,
                &hyper.beta_r,
                &hyper.w_r,
                config,
                rng,
            )
            .unwrap()
            .x;

            params.mu[(j, k)] = mu;
            params.s_l[(j, k)] = s_l;
            params.s_r[(j, k)] = s_r;
        }
    }

    for k in 0..N_FEATURES {
        delta_a[k] =
            sample_delta_a(delta_a[k], delta_b[k], &params.rho, k, config, rng)
                .unwrap()
                .x;
        delta_b[k] =
            sample_delta_b(delta_a[k], delta_b[k], &params.rho, k, config, rng)
                .unwrap()
                .x;
    }

    // weight of each component for each observation
    let (n, m, d) = z.dims();
    let pvec = Matrix::from_vecs(
        (0..m)
            .map(|j| {
                (0..n)
                    .map(|i| (0..d).map(|k| z[(i, j, k)]).sum::<f64>())
                    .collect()
            })
            .collect(),
    );
    draw_indicator(&pvec, rng)
}

#[test]
fn sweep_keeps_parameters_in_their_domains() {
    init_logger();
    let mut rng = seeded_rng(1337);
    let x = two_clusters(&mut rng);
    let hyper = Hyperpriors::repeated(N_FEATURES, 0.0, 0.1, 2.0, 1.0);
    let config = MhConfig::new().n_iters(200);

    let mut params = init_params();
    let mut delta_a = vec![1.0; N_FEATURES];
    let mut delta_b = vec![1.0; N_FEATURES];

    let mut assignment = Vec::new();
    for _ in 0..3 {
        assignment = sweep(
            &x,
            &mut params,
            &mut delta_a,
            &mut delta_b,
            &hyper,
            &config,
            &mut rng,
        );
    }

    assert!(params.validate().is_ok());
    assert!(delta_a.iter().chain(delta_b.iter()).all(|&d| d > 0.0));
    assert_eq!(assignment.len(), x.n_rows());
    assert!(assignment.iter().all(|&z| z < N_COMPONENTS));

    let n_occupied = {
        let mut occupied = [false; N_COMPONENTS];
        assignment.iter().for_each(|&z| occupied[z] = true);
        occupied.iter().filter(|&&o| o).count()
    };
    let alphas = draw_alpha(n_occupied, x.n_rows(), 10, &mut rng).unwrap();
    assert!(alphas.iter().all(|&a| a > 0.0));

    for k in 0..N_FEATURES {
        let betas = draw_beta_ars(
            &hyper.w_l,
            &params.s_l,
            &params.s_l_irr,
            k,
            10,
            &mut rng,
        )
        .unwrap();
        assert!(betas.iter().all(|&b| b > 2.0));
    }

    let prior_predictive = integral_approx(
        &x,
        &hyper,
        &delta_a,
        &delta_b,
        &IntegralConfig::default(),
        &mut rng,
    )
    .unwrap();
    assert_eq!(prior_predictive.len(), x.n_rows());
    assert!(prior_predictive.iter().all(|&p| p >= 0.0 && p.is_finite()));
}

#[test]
fn components_move_to_the_clusters() {
    init_logger();
    let mut rng = seeded_rng(7);
    let x = two_clusters(&mut rng);
    let hyper = Hyperpriors::repeated(N_FEATURES, 0.0, 0.1, 2.0, 1.0);
    let config = MhConfig::new()
        .n_iters(300)
        .proposal_scale(0.5)
        .prior_ratio(PriorRatio::ClosedForm);

    let mut params = init_params();
    let mut delta_a = vec![1.0; N_FEATURES];
    let mut delta_b = vec![1.0; N_FEATURES];

    let mut assignment = Vec::new();
    for _ in 0..5 {
        assignment = sweep(
            &x,
            &mut params,
            &mut delta_a,
            &mut delta_b,
            &hyper,
            &config,
            &mut rng,
        );
    }

    // component 0 started on the negative side and component 1 on the
    // positive side
    for k in 0..N_FEATURES {
        assert!(params.mu[(0, k)] < -1.5);
        assert!(params.mu[(1, k)] > 1.5);
    }

    let n_correct = assignment
        .iter()
        .enumerate()
        .filter(|&(i, &z)| (i < N_PER_CLUSTER) == (z == 0))
        .count();
    assert!(n_correct as f64 > 0.9 * x.n_rows() as f64);
}

#[test]
fn samplers_are_reproducible_given_a_seed() {
    let run = |seed: u64| {
        let mut rng = seeded_rng(seed);
        let x = two_clusters(&mut rng);
        let hyper = Hyperpriors::repeated(N_FEATURES, 0.0, 0.1, 2.0, 1.0);
        let mut params = init_params();
        let mut delta_a = vec![1.0; N_FEATURES];
        let mut delta_b = vec![1.0; N_FEATURES];
        let assignment = sweep(
            &x,
            &mut params,
            &mut delta_a,
            &mut delta_b,
            &hyper,
            &MhConfig::new().n_iters(50),
            &mut rng,
        );
        (params, delta_a, delta_b, assignment)
    };

    assert_eq!(run(11), run(11));
}

#[test]
fn precision_samplers_respect_domain_for_many_seeds() {
    let hyper = Hyperpriors::repeated(N_FEATURES, 0.0, 1.0, 2.0, 1.0);
    let config = MhConfig::default();

    for seed in 0..10 {
        let mut rng = seeded_rng(seed);
        let x = two_clusters(&mut rng);
        let z = Tensor3::from_fn(x.n_rows(), 1, N_FEATURES, |_, _, _| 1.0);
        let site = Site::new(&x, &z, 0, 1).unwrap();

        let s_l = sample_s_ljk(
            &site,
            0.0,
            1.0,
            1.0,
            &hyper.beta_l,
            &hyper.w_l,
            &config,
            &mut rng,
        )
        .unwrap();
        let s_r = sample_s_rjk(
            &site,
            0.0,
            1.0,
            1.0,
            &hyper.beta_r,
            &hyper.w_r,
            &config,
            &mut rng,
        )
        .unwrap();

        assert!(s_l.x > 0.0, "seed {seed}: s_l = {}", s_l.x);
        assert!(s_r.x > 0.0, "seed {seed}: s_r = {}", s_r.x);
        assert_eq!(s_r.n_proposed + s_r.n_skipped, config.n_iters);
    }
}

#[test]
fn delta_samplers_respect_domain_for_many_seeds() {
    let config = MhConfig::default();
    assert_eq!(config.n_iters, 750);
    let rho = Matrix::from_vecs(vec![
        vec![0.9, 0.05],
        vec![0.7, 0.2],
        vec![0.95, 0.5],
        vec![0.6, 0.01],
    ]);

    for seed in 0..10 {
        let mut rng = seeded_rng(seed);
        for k in 0..N_FEATURES {
            let delta_a =
                sample_delta_a(1.0, 1.0, &rho, k, &config, &mut rng).unwrap();
            let delta_b =
                sample_delta_b(delta_a.x, 1.0, &rho, k, &config, &mut rng)
                    .unwrap();

            assert!(delta_a.x > 0.0, "seed {seed}: delta_a = {}", delta_a.x);
            assert!(delta_b.x > 0.0, "seed {seed}: delta_b = {}", delta_b.x);
            assert!(delta_a.x.is_finite() && delta_b.x.is_finite());
            assert_eq!(delta_a.n_proposed + delta_a.n_skipped, config.n_iters);
            assert_eq!(delta_b.n_proposed + delta_b.n_skipped, config.n_iters);
        }
    }
}
