use criterion::{Criterion, black_box, criterion_group, criterion_main};
use recoil_core::movement::{MovementParams, step_displacement};
use recoil_core::{Barrel, Multipliers, Scope, WeaponStore};

// One full burst worth of conversions for every built-in weapon.
pub fn bench_burst_conversion(c: &mut Criterion) {
    let store = WeaponStore::builtin();
    let mut group = c.benchmark_group("movement");

    for weapon in store.iter() {
        let params = MovementParams {
            multipliers: Multipliers::resolve(&weapon.id, Scope::Holographic, Barrel::Silencer),
            sensitivity: 0.8,
            fov: 90.0,
        };
        group.bench_function(format!("burst_{}", weapon.id), |b| {
            b.iter(|| {
                let mut acc = (0i64, 0i64);
                for (i, p) in weapon.pattern.iter().enumerate() {
                    let crouching = i % 2 == 0;
                    let (dx, dy) = step_displacement(black_box(p.x), black_box(p.y), crouching, &params);
                    acc.0 += i64::from(dx);
                    acc.1 += i64::from(dy);
                }
                black_box(acc)
            })
        });
    }

    group.bench_function("resolve_multipliers", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for w in ["AK47", "SMG", "THOMPSON", "M249"] {
                for s in Scope::ALL {
                    for br in Barrel::ALL {
                        let m = Multipliers::resolve(black_box(w), s, br);
                        sum += m.scope * m.barrel;
                    }
                }
            }
            black_box(sum)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_burst_conversion);
criterion_main!(benches);
