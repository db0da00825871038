//! Generates a deterministic synthetic employee dataset at `EA.csv` so the
//! dashboard has something to show out of the box.

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let departments: [(&str, &[&str]); 3] = [
        ("Sales", &["Sales Executive", "Sales Representative"]),
        (
            "Research & Development",
            &["Research Scientist", "Laboratory Technician", "Manager"],
        ),
        ("Human Resources", &["Human Resources", "Manager"]),
    ];
    let genders = ["Female", "Male"];
    let marital = ["Single", "Married", "Divorced"];

    let output_path = "EA.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");

    writer
        .write_record([
            "Age",
            "Attrition",
            "Department",
            "Education",
            "Gender",
            "JobRole",
            "JobSatisfaction",
            "MaritalStatus",
            "MonthlyIncome",
            "OverTime",
            "WorkLifeBalance",
            "YearsAtCompany",
            "YearsSinceLastPromotion",
        ])
        .expect("Failed to write header");

    let n_rows = 400;
    for _ in 0..n_rows {
        let (dept, roles) = *rng.choose(&departments);
        let role = *rng.choose(roles);
        let gender = *rng.choose(&genders);
        let status = *rng.choose(&marital);

        let age = rng.gauss(37.0, 9.0).clamp(18.0, 60.0).round() as i64;
        let education = 1 + (rng.next_u64() % 5) as i64;
        let job_satisfaction = 1 + (rng.next_u64() % 4) as i64;
        let work_life_balance = 1 + (rng.next_u64() % 4) as i64;
        let overtime = rng.next_f64() < 0.3;
        let years_at_company = (rng.gauss(7.0, 5.0).max(0.0)).round() as i64;
        let years_since_promotion =
            (rng.gauss(2.0, 2.5).max(0.0)).round().min(years_at_company as f64) as i64;
        let income = (rng.gauss(6500.0, 2500.0).max(1200.0) * 100.0).round() / 100.0;

        // Leaving is more likely for overtime workers, low satisfaction,
        // and short tenure.
        let mut p_leave = 0.10;
        if overtime {
            p_leave += 0.15;
        }
        if job_satisfaction <= 2 {
            p_leave += 0.10;
        }
        if years_at_company <= 2 {
            p_leave += 0.10;
        }
        let attrition = if rng.next_f64() < p_leave { "Yes" } else { "No" };

        writer
            .write_record([
                age.to_string(),
                attrition.to_string(),
                dept.to_string(),
                education.to_string(),
                gender.to_string(),
                role.to_string(),
                job_satisfaction.to_string(),
                status.to_string(),
                income.to_string(),
                if overtime { "Yes" } else { "No" }.to_string(),
                work_life_balance.to_string(),
                years_at_company.to_string(),
                years_since_promotion.to_string(),
            ])
            .expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_rows} employee records to {output_path}");
}
