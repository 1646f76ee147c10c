//! Fixed content pools for the deterministic generator
//!
//! Every string the "board" ever says lives here. Pools are fixed-size
//! arrays so index selection stays stable: reordering or resizing a pool
//! changes every session's generated content.
//!
//! Placeholders: `{quality}` (score-derived label), `{idea}` (idea name),
//! `{audience}` (target audience description). Each placeholder appears at
//! most once per template and is substituted once.

use crate::types::AdvisorType;

/// Diagnosis and prescription pools for one advisor.
pub struct AdvisorTemplates {
    pub diagnoses: [&'static str; 3],
    pub prescriptions: [&'static str; 3],
}

/// The pool for a given advisor type.
pub fn advisor_templates(advisor: AdvisorType) -> AdvisorTemplates {
    match advisor {
        AdvisorType::Operator => AdvisorTemplates {
            diagnoses: [
                "Your operational foundation shows {quality}. The execution plan for '{idea}' needs more specificity around resource allocation and timelines.",
                "The operational model has {quality} structure. I see gaps in how you'll scale '{idea}' from 10 to 100 customers.",
                "Your operations thinking is {quality}, but the supply chain and logistics for '{idea}' aren't clearly mapped out.",
            ],
            prescriptions: [
                "Map out your first 90 days. List the 5 critical hires you need and when. Create a simple Gantt chart.",
                "Write down your customer onboarding process step-by-step. Time each step. Find the bottleneck.",
                "Calculate your unit economics: Cost to deliver one unit of '{idea}' to one customer. Be specific.",
            ],
        },
        AdvisorType::Growth => AdvisorTemplates {
            diagnoses: [
                "Your growth strategy shows {quality} understanding of acquisition channels. For '{idea}', I don't see a clear customer acquisition playbook.",
                "The market approach has {quality} potential, but you're missing key metrics. How will you get your first 100 customers for '{idea}'?",
                "Your positioning is {quality}, but the go-to-market motion for '{idea}' lacks focus. You're trying to be everywhere at once.",
            ],
            prescriptions: [
                "Pick ONE channel for the next 30 days. Master it. Write down 3 experiments you'll run this week.",
                "Interview 10 people from '{audience}'. Ask: 'Where do you look for solutions like this?' Use their language.",
                "Create a simple referral loop. Answer: Why would someone tell their friend about '{idea}'? Make it easy.",
            ],
        },
        AdvisorType::Finance => AdvisorTemplates {
            diagnoses: [
                "Your financial model shows {quality} thinking, but the unit economics for '{idea}' aren't sustainable at scale.",
                "The revenue assumptions have {quality} grounding. I need to see CAC, LTV, and payback period for '{idea}'.",
                "Your pricing strategy is {quality}, but you haven't validated willingness to pay for '{idea}' with real data.",
            ],
            prescriptions: [
                "Build a simple spreadsheet: Month 1-12. Track: Revenue, Costs, Cash. Be conservative. Add a buffer.",
                "Calculate: If you charge $X, how many customers do you need to break even? Is that realistic in 6 months?",
                "Run a pricing test: Offer '{idea}' to 5 people at different price points. See what they actually pay, not what they say.",
            ],
        },
        AdvisorType::Product => AdvisorTemplates {
            diagnoses: [
                "Your product vision shows {quality} clarity, but '{idea}' tries to solve too many problems at once.",
                "The user experience has {quality} foundation. The core value prop of '{idea}' gets buried in features.",
                "Your product thinking is {quality}, but you haven't identified the one thing that makes '{idea}' 10x better than alternatives.",
            ],
            prescriptions: [
                "Cut your feature list in half. Now cut it again. What's the ONE thing users can't live without in '{idea}'?",
                "Draw the user journey on paper: First visit to 'aha moment'. Count the steps. Every step loses 20% of users.",
                "Build the absolute minimum version in 2 weeks. Just enough to test if '{audience}' actually wants this. Ship it.",
            ],
        },
        AdvisorType::Skeptic => AdvisorTemplates {
            diagnoses: [
                "I see {quality} potential, but let's talk risks. The biggest threat to '{idea}' is market timing. Why now?",
                "Your assumptions show {quality} reasoning, but '{idea}' depends on behavior change, which is incredibly hard.",
                "The competitive landscape is {quality} analyzed. What stops a bigger player from copying '{idea}' in 6 months?",
            ],
            prescriptions: [
                "List your 3 biggest assumptions. For each, write: 'What if I'm wrong?' Build a plan B for each.",
                "Research your competitors deeply. Find where they're weak. That's your wedge. Write it down in one sentence.",
                "Talk to 5 people who tried to build something similar. Ask what killed their project. Learn from their mistakes.",
            ],
        },
    }
}

/// A market segment with its persona variants and willingness-to-buy range.
pub struct MarketSegment {
    pub names: [&'static str; 3],
    pub descriptions: [&'static str; 3],
    pub reactions: [&'static str; 3],
    /// Half-open `[min, max)` range for willingness_to_buy.
    pub willingness_range: (u32, u32),
}

/// The three fixed segments: individual/freelance, small business, enterprise.
pub fn market_segments() -> [MarketSegment; 3] {
    [
        MarketSegment {
            names: [
                "Sarah Chen, Product Manager",
                "Michael Torres, Freelance Designer",
                "Emma Wilson, Startup Founder",
            ],
            descriptions: [
                "Works remotely, juggles multiple tools, values efficiency",
                "Budget-conscious, seeks simple solutions that just work",
                "Early adopter, willing to try new tools if they save time",
            ],
            reactions: [
                "I like the concept of {idea}, but I'm already using 3 similar tools. Would need a compelling reason to switch.",
                "The idea is interesting, but the pricing needs to be clearer upfront. I don't want surprises.",
                "This could work if it integrates with my existing workflow. The onboarding needs to be under 5 minutes.",
            ],
            willingness_range: (45, 75),
        },
        MarketSegment {
            names: [
                "David Park, Small Business Owner",
                "Lisa Rodriguez, Team Lead",
                "James Anderson, Consultant",
            ],
            descriptions: [
                "Time-poor, needs solutions that work out of the box",
                "Risk-averse, prefers proven solutions with good support",
                "Price-sensitive, compares multiple options carefully",
            ],
            reactions: [
                "{idea} sounds useful, but I need to see case studies from businesses like mine first.",
                "I'm interested, but the learning curve concerns me. My team is already stretched thin.",
                "The value proposition is clear, but I'd want a trial period to test it with real scenarios.",
            ],
            willingness_range: (30, 60),
        },
        MarketSegment {
            names: [
                "Priya Sharma, Enterprise Manager",
                "Alex Thompson, Operations Director",
                "Rachel Kim, VP of Product",
            ],
            descriptions: [
                "Needs enterprise features: security, compliance, reporting",
                "Evaluates ROI carefully, long sales cycles",
                "Requires integration with existing enterprise stack",
            ],
            reactions: [
                "For {idea} to work at our scale, we'd need SSO, audit logs, and dedicated support. Happy to pay for that.",
                "Interesting approach, but I'd need to see a detailed security and compliance document before we can consider it.",
                "The core idea is solid, but enterprise adoption requires change management support and training materials.",
            ],
            willingness_range: (60, 85),
        },
    ]
}

/// The full next-action pool. Five are picked per session.
pub const ACTION_POOL: [&str; 10] = [
    "Email 5 people from your target audience and ask for a 15-minute call",
    "Create a simple landing page and drive 100 visitors to it this week",
    "Build a mockup or prototype that demonstrates your core value prop",
    "Write down your unit economics: revenue per customer vs cost to serve",
    "Interview 3 people who use competing solutions and ask what they love and hate",
    "Set up a simple analytics dashboard to track your key metric",
    "Find 2-3 communities where your target audience hangs out and join them",
    "Create a one-page pitch deck and practice your 2-minute pitch",
    "Calculate your runway: how long can you work on this with current resources?",
    "Identify your riskiest assumption and design a test to validate it",
];

/// Opening sentences for rewritten evidence-phase diagnoses.
pub const IMPROVEMENT_PHRASES: [&str; 4] = [
    "Your updated data shows real progress.",
    "I see tangible evidence of validation.",
    "The additional research strengthens your case.",
    "Good work gathering real-world feedback.",
];

/// Closing caveats for rewritten evidence-phase diagnoses.
pub const CONCERN_PHRASES: [&str; 4] = [
    "but keep pushing for more specific metrics.",
    "though I still want to see longer-term data.",
    "but validate this with a larger sample size.",
    "though watch out for confirmation bias.",
];

/// Score-derived qualitative label used inside diagnosis templates.
/// Thresholds apply to the unrounded score.
pub fn quality_label(score: f64) -> &'static str {
    if score > 7.0 {
        "solid"
    } else if score > 5.0 {
        "decent"
    } else {
        "weak"
    }
}

/// Verdict for the initial pattern-check board pass.
pub fn pattern_verdict(average_score: f64) -> &'static str {
    if average_score >= 8.0 {
        "Strong potential. Focus on execution and validation."
    } else if average_score >= 6.0 {
        "Promising concept. Address the key concerns before scaling."
    } else {
        "Needs refinement. Use the feedback to strengthen your foundation."
    }
}

/// Verdict after an evidence resubmission. Distinct, finer-grained brackets.
pub fn evidence_verdict(average_score: f64) -> &'static str {
    if average_score >= 8.0 {
        "Excellent progress. Your validation data is strong. Ready to scale."
    } else if average_score >= 7.0 {
        "Solid improvement. Continue gathering evidence and iterating."
    } else if average_score >= 6.0 {
        "Moving in the right direction. More validation needed before major investment."
    } else {
        "Some progress made. Revisit core assumptions and gather stronger evidence."
    }
}

/// Substitute `{placeholder}` once, mirroring single-occurrence replacement.
pub fn fill(template: &str, placeholder: &str, value: &str) -> String {
    template.replacen(placeholder, value, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ADVISORS;

    #[test]
    fn test_every_advisor_has_three_of_each() {
        for advisor in ADVISORS {
            let t = advisor_templates(advisor);
            assert_eq!(t.diagnoses.len(), 3);
            assert_eq!(t.prescriptions.len(), 3);
            for d in t.diagnoses {
                assert!(d.contains("{quality}"), "{advisor:?} diagnosis missing label slot");
                assert!(d.contains("{idea}"), "{advisor:?} diagnosis missing idea slot");
            }
        }
    }

    #[test]
    fn test_segments_have_valid_ranges() {
        for segment in market_segments() {
            let (min, max) = segment.willingness_range;
            assert!(min < max);
            assert!(max <= 100);
        }
    }

    #[test]
    fn test_quality_label_brackets() {
        assert_eq!(quality_label(7.1), "solid");
        assert_eq!(quality_label(7.0), "decent");
        assert_eq!(quality_label(5.1), "decent");
        assert_eq!(quality_label(5.0), "weak");
        assert_eq!(quality_label(4.0), "weak");
    }

    #[test]
    fn test_pattern_verdict_brackets() {
        assert!(pattern_verdict(8.0).starts_with("Strong potential"));
        assert!(pattern_verdict(7.9).starts_with("Promising"));
        assert!(pattern_verdict(6.0).starts_with("Promising"));
        assert!(pattern_verdict(5.9).starts_with("Needs refinement"));
    }

    #[test]
    fn test_evidence_verdict_brackets() {
        assert!(evidence_verdict(8.0).starts_with("Excellent"));
        assert!(evidence_verdict(7.5).starts_with("Solid improvement"));
        assert!(evidence_verdict(6.2).starts_with("Moving in the right"));
        assert!(evidence_verdict(5.9).starts_with("Some progress"));
    }

    #[test]
    fn test_fill_replaces_first_occurrence_only() {
        assert_eq!(fill("{idea} and {idea}", "{idea}", "X"), "X and {idea}");
        assert_eq!(fill("no slots here", "{idea}", "X"), "no slots here");
    }
}
