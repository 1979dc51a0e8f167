//! Fixed instruction templates for the narrative model.
//!
//! The templates do not include the classifier's predictions. Threading the
//! findings into the prompt is a known open item and deliberately not done
//! here.

use crate::models::Modality;

const MRI_PROMPT: &str = "As a medical AI expert, analyze this MRI scan and provide a clear, patient-friendly interpretation. Focus on the following key points:

  1. **Findings:**
     - Describe any visible abnormalities or normal findings.
     - Summarize the general condition of the scanned area.
     - Indicate whether the findings appear normal or require further attention.

  2. **Patient Guidance:**
     - Highlight key points to discuss with the doctor.
     - Suggest relevant questions to ask about the findings.
     - Mention any lifestyle considerations based on the results.

  3. **Next Steps:**
     - Recommend appropriate follow-up actions.
     - Advise when to see the doctor next.
     - Note any immediate concerns that need addressing.

  4. **Important Notes:**
     - List warning signs to watch for.
     - Specify when to seek immediate medical care.
     - Provide general health recommendations.

  Use clear, simple language and maintain a professional yet empathetic tone. If applicable, include specific medical terminology to enhance accuracy.";

const XRAY_PROMPT: &str = "As a medical AI expert, analyze this X-ray scan and provide a clear, patient-friendly interpretation. Focus on the following key points:

  1. **Findings:**
     - Describe any visible abnormalities or normal findings.
     - Summarize the general condition of the scanned area.
     - Indicate whether the findings appear normal or require further attention.

  2. **Patient Guidance:**
     - Highlight key points to discuss with the doctor.
     - Suggest relevant questions to ask about the findings.
     - Mention any lifestyle considerations based on the results.

  3. **Next Steps:**
     - Recommend appropriate follow-up actions.
     - Advise when to see the doctor next.
     - Note any immediate concerns that need addressing.

  4. **Important Notes:**
     - List warning signs to watch for.
     - Specify when to seek immediate medical care.
     - Provide general health recommendations.

  Use clear, simple language and maintain a professional yet empathetic tone. If applicable, include specific medical terminology to enhance accuracy.";

/// Instruction template for the given modality.
pub fn instruction_for(modality: Modality) -> &'static str {
    match modality {
        Modality::Mri => MRI_PROMPT,
        Modality::Xray => XRAY_PROMPT,
    }
}
