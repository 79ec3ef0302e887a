use crate::engines::generation::space::{DomainKind, ParameterSpace, ParameterSpec};
use crate::types::Configuration;
use rand::seq::SliceRandom;
use rand::Rng;

/// Draw one value uniformly from the spec's domain
pub fn random_value<R: Rng>(spec: &ParameterSpec, rng: &mut R) -> i64 {
    match spec.kind {
        DomainKind::Integer => rng.gen_range(spec.low..=spec.high),
        DomainKind::PowerOfTwo => {
            let powers = spec.powers_of_two();
            // Validated spaces always have at least one candidate
            *powers.choose(rng).unwrap_or(&spec.low)
        }
    }
}

/// Generate random configuration, one independent draw per parameter
pub fn random_config<R: Rng>(space: &ParameterSpace, rng: &mut R) -> Configuration {
    space
        .specs()
        .iter()
        .map(|spec| (spec.name.clone(), random_value(spec, rng)))
        .collect()
}

/// Uniform crossover: each parameter comes from either parent with equal probability
pub fn crossover<R: Rng>(
    space: &ParameterSpace,
    parent1: &Configuration,
    parent2: &Configuration,
    rng: &mut R,
) -> Configuration {
    space
        .specs()
        .iter()
        .map(|spec| {
            let from_first = rng.gen::<bool>();
            let allele = if from_first {
                parent1.get(&spec.name)
            } else {
                parent2.get(&spec.name)
            };
            // A parent missing the gene cannot happen for in-space configurations
            let value = allele
                .or_else(|| parent1.get(&spec.name))
                .or_else(|| parent2.get(&spec.name))
                .unwrap_or_else(|| random_value(spec, rng));
            (spec.name.clone(), value)
        })
        .collect()
}

/// Mutation: each parameter is redrawn with probability `mutation_rate`
pub fn mutate<R: Rng>(
    space: &ParameterSpace,
    config: &Configuration,
    mutation_rate: f64,
    rng: &mut R,
) -> Configuration {
    let mut mutant = config.clone();
    for spec in space.specs() {
        if rng.gen::<f64>() < mutation_rate {
            mutant.insert(spec.name.clone(), random_value(spec, rng));
        }
    }
    mutant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::space::ParameterSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn llbp_like_space() -> ParameterSpace {
        ParameterSpace::new(vec![
            ParameterSpec::power_of_two("numPatterns", 4, 64),
            ParameterSpec::power_of_two("numContexts", 1024, 8192),
            ParameterSpec::power_of_two("pbSize", 16, 256),
            ParameterSpec::power_of_two("oddBounds", 3, 100),
            ParameterSpec::integer("TTWidth", 1, 32),
            ParameterSpec::integer("accessDelay", 1, 32),
        ])
        .unwrap()
    }

    #[test]
    fn test_random_config_stays_in_domain() {
        let space = llbp_like_space();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let config = random_config(&space, &mut rng);
            assert!(space.contains(&config), "out of domain: {}", config);
            for spec in space.specs() {
                let value = config.get(&spec.name).unwrap();
                assert!(value >= spec.low && value <= spec.high);
                if spec.kind == DomainKind::PowerOfTwo {
                    assert_eq!(value.count_ones(), 1, "{} = {} is not a power of two", spec.name, value);
                }
            }
        }
    }

    #[test]
    fn test_crossover_only_uses_parent_alleles() {
        let space = llbp_like_space();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let a = random_config(&space, &mut rng);
            let b = random_config(&space, &mut rng);
            let child = crossover(&space, &a, &b, &mut rng);

            for spec in space.specs() {
                let value = child.get(&spec.name).unwrap();
                assert!(value == a.get(&spec.name).unwrap() || value == b.get(&spec.name).unwrap());
            }
        }
    }

    #[test]
    fn test_crossover_mixes_both_parents() {
        let names: Vec<String> = (0..32).map(|i| format!("p{}", i)).collect();
        let space = ParameterSpace::new(
            names.iter().map(|n| ParameterSpec::integer(n.clone(), 0, 1)).collect(),
        )
        .unwrap();
        let zeros: Configuration = names.iter().map(|n| (n.clone(), 0)).collect();
        let ones: Configuration = names.iter().map(|n| (n.clone(), 1)).collect();

        let mut rng = StdRng::seed_from_u64(3);
        let child = crossover(&space, &zeros, &ones, &mut rng);
        let from_ones = child.iter().filter(|(_, v)| *v == 1).count();

        // 32 fair coin flips; all-or-nothing has probability 2^-31
        assert!(from_ones > 0 && from_ones < 32);
    }

    #[test]
    fn test_mutate_rate_zero_is_identity() {
        let space = llbp_like_space();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let config = random_config(&space, &mut rng);
            assert_eq!(mutate(&space, &config, 0.0, &mut rng), config);
        }
    }

    #[test]
    fn test_mutate_rate_one_redraws_every_gene() {
        let space = llbp_like_space();
        let mut seeded = StdRng::seed_from_u64(9);
        let config = random_config(&space, &mut seeded);

        // Replay the same stream: one coin plus one domain draw per gene
        let mut rng = StdRng::seed_from_u64(99);
        let mut replay = StdRng::seed_from_u64(99);
        let mutant = mutate(&space, &config, 1.0, &mut rng);

        for spec in space.specs() {
            let _coin: f64 = replay.gen();
            let expected = random_value(spec, &mut replay);
            assert_eq!(mutant.get(&spec.name), Some(expected));
        }
        assert!(space.contains(&mutant));
    }

    #[test]
    fn test_operators_are_deterministic_under_seed() {
        let space = llbp_like_space();
        let run = || {
            let mut rng = StdRng::seed_from_u64(42);
            let a = random_config(&space, &mut rng);
            let b = random_config(&space, &mut rng);
            let child = crossover(&space, &a, &b, &mut rng);
            mutate(&space, &child, 0.3, &mut rng)
        };
        assert_eq!(run(), run());
    }
}
