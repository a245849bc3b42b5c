//! Plain-text rendering of analytics results for the terminal.

use traininsight_core::analytics::{
    CourseEnrollment, DepartmentStats, Kpis, MonthlyCount, PerformanceRanking,
};
use traininsight_core::{
    Diagnostic, EmployeeProfile, Recommendation, SegmentationReport, Severity,
};

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

pub fn kpis(k: &Kpis) -> String {
    format!(
        "Total employees:     {}\n\
         Training records:    {}\n\
         Completed trainings: {}\n\
         Average score:       {}\n\
         Completion rate:     {:.1}%\n",
        k.total_employees,
        k.total_records,
        k.completed_trainings,
        fmt_opt(k.average_score),
        k.completion_rate_pct
    )
}

pub fn departments(stats: &[DepartmentStats]) -> String {
    let width = stats
        .iter()
        .map(|s| s.department.len())
        .max()
        .unwrap_or(10)
        .max(10);
    let mut out = format!(
        "{:<width$}  {:>9}  {:>7}  {:>7}  {:>5}  {:>5}  {:>10}\n",
        "Department", "Employees", "Records", "Avg", "Min", "Max", "Completion"
    );
    for s in stats {
        out.push_str(&format!(
            "{:<width$}  {:>9}  {:>7}  {:>7}  {:>5}  {:>5}  {:>9.1}%\n",
            s.department,
            s.total_employees,
            s.total_records,
            fmt_opt(s.avg_score),
            fmt_opt(s.min_score),
            fmt_opt(s.max_score),
            s.completion_rate_pct
        ));
    }
    out
}

pub fn trend(trend: &[MonthlyCount]) -> String {
    let mut out = String::new();
    for m in trend {
        out.push_str(&format!("{}  {:<12} {}\n", m.month, m.status.as_str(), m.count));
    }
    out
}

pub fn courses(courses: &[CourseEnrollment]) -> String {
    let mut out = String::new();
    for (i, c) in courses.iter().enumerate() {
        out.push_str(&format!("{:>2}. {} ({})\n", i + 1, c.course, c.enrollments));
    }
    out
}

pub fn ranking(ranking: &PerformanceRanking) -> String {
    let mut out = String::from("Top performers:\n");
    for v in &ranking.top {
        out.push_str(&format!(
            "  {} {:<24} {:<30} {:>6.1}  {:>5.1}%\n",
            v.employee_id,
            v.employee_name,
            v.department,
            v.avg_score,
            v.completion_rate * 100.0
        ));
    }
    out.push_str("Needs attention:\n");
    for v in &ranking.bottom {
        out.push_str(&format!(
            "  {} {:<24} {:<30} {:>6.1}  {:>5.1}%\n",
            v.employee_id,
            v.employee_name,
            v.department,
            v.avg_score,
            v.completion_rate * 100.0
        ));
    }
    out
}

pub fn segmentation(report: &SegmentationReport, show_members: usize) -> String {
    let mut out = String::new();
    for s in &report.summaries {
        out.push_str(&format!(
            "[{}] {} ({} employees)  avg score {:.1}  completion {:.1}%  avg trainings {:.1}\n",
            s.cluster_index,
            s.label,
            s.member_count,
            s.mean_avg_score,
            s.mean_completion_rate * 100.0,
            s.mean_total_trainings
        ));
        for a in report.members(&s.label).take(show_members) {
            out.push_str(&format!(
                "    {} {:<24} {:<30} {:>6.1}  {}\n",
                a.employee_id, a.employee_name, a.department, a.avg_score, a.total_trainings
            ));
        }
    }
    if !report.converged {
        out.push_str(&format!(
            "note: partitioning stopped at the iteration cap ({})\n",
            report.iterations
        ));
    }
    out
}

pub fn recommendations(profile: &EmployeeProfile, recs: &[Recommendation]) -> String {
    let mut out = format!(
        "Recommended for {} {} ({}, {} courses taken):\n",
        profile.employee_id,
        profile.employee_name,
        profile.department,
        profile.taken.len()
    );
    if recs.is_empty() {
        out.push_str("  nothing left to recommend\n");
    }
    for (i, r) in recs.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:<36} score {:>5.2}  completion {:>5.1}%  popularity {:>5.1}%  boost {:.1}\n",
            i + 1,
            r.course,
            r.score,
            r.signals.completion_rate * 100.0,
            r.signals.popularity * 100.0,
            r.match_boost
        ));
    }
    out
}

pub fn diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for d in diagnostics {
        let tag = match d.severity() {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        out.push_str(&format!("{tag}: {d}\n"));
    }
    out
}
