//! Prompt templates for the simulated customer agents.
//!
//! Templates are embedded as constants; persona files produced by older
//! tooling may already carry the instruction block, in which case wrapping is
//! skipped rather than doubled.

const PERSONA_INSTRUCTIONS: &str = "\
{persona_description}

INSTRUCTIONS FOR RESPONDING:
- Stay fully in character as the customer described above.
- React in the first person, in your own voice, in 2-4 sentences.
- Be honest: say whether you would actually buy or use this, and why.
- Ground your reaction in your own shopping habits, tastes, and budget.
- Do not mention that you are an AI or that this is a simulation.";

const EVALUATION_TEMPLATE: &str = "\
We're considering the following product or change and want your honest \
reaction as a customer:

{product_description}

Would this appeal to you? Why or why not?";

/// Wrap a persona narrative with the agent instruction block.
///
/// Personas that already contain an instruction block are returned unchanged.
pub fn format_agent_prompt(persona: &str) -> String {
    if persona.contains("INSTRUCTIONS FOR RESPONDING:")
        || persona.contains("IMPORTANT INSTRUCTIONS:")
    {
        return persona.to_string();
    }
    PERSONA_INSTRUCTIONS.replace("{persona_description}", persona)
}

/// Format the product evaluation user message.
pub fn format_evaluation_prompt(product_description: &str) -> String {
    EVALUATION_TEMPLATE.replace("{product_description}", product_description)
}
