use error_set::error_set;

error_set! {
    InnerProductError = {
        #[display("{public} public polynomials cannot be paired with {secret} secret polynomials")]
        MismatchedPairs {
            public: usize,
            secret: usize,
        },
        #[display("polynomial of degree {degree} does not respect degree bound {bound}")]
        DegreeBoundExceeded {
            degree: usize,
            bound: usize,
        },
        #[display("summation domain of size {size} must be smaller than degree bound {bound}")]
        SummationDomainTooLarge {
            size: usize,
            bound: usize,
        },
        #[display("summation domain size {size} is not invertible in the field")]
        SummationSizeNotInvertible {
            size: usize,
        },
        #[display("at least one repetition is required")]
        NoRepetitions,
        #[display("expected challenges for {expected} repetitions, found {found}")]
        RepetitionChallenges {
            expected: usize,
            found: usize,
        },
        #[display("quotients must be committed before the combination challenges are used")]
        QuotientsNotCommitted,
        #[display("FRI rounds requested before the codewords were combined")]
        FriNotStarted,
    } || FriError;
    FriError = {
        #[display("localization parameters must be non-empty and positive")]
        InvalidLocalization,
        #[display("localization removes {reduction} dimensions from a domain of dimension {dimension}")]
        LocalizationTooDeep {
            reduction: usize,
            dimension: usize,
        },
        #[display("degree bound {bound} is not usable on a domain of size {size}")]
        InvalidDegreeBound {
            bound: usize,
            size: usize,
        },
        #[display("degree bound {bound} is not a multiple of the folding factor {factor}")]
        UnalignedDegreeBound {
            bound: usize,
            factor: usize,
        },
        #[display("protocol only runs over multiplicative cosets")]
        AdditiveDomain,
        #[display("round {requested} requested while round {expected} is pending")]
        RoundOrder {
            requested: usize,
            expected: usize,
        },
        #[display("expected {expected} folding challenges, found {found}")]
        FoldingChallenges {
            expected: usize,
            found: usize,
        },
        #[display("query position {position} lies outside a domain of size {size}")]
        QueryPosition {
            position: usize,
            size: usize,
        },
    } || DomainError || MerkleError;
    DomainError = {
        #[display("domain size {size} is not a power of two")]
        InvalidDomain {
            size: usize,
        },
        #[display("field has no subgroup of size {size}")]
        UnsupportedDomainSize {
            size: usize,
        },
        #[display("coset shift must be non-zero")]
        ZeroShift,
        #[display("affine subspaces require a field of characteristic two")]
        NotBinaryField,
        #[display("basis vector {index} lies in the span of the previous ones")]
        DependentBasis {
            index: usize,
        },
        #[display("expected {expected} evaluations, found {found}")]
        EvaluationLength {
            expected: usize,
            found: usize,
        },
    };
    MerkleError = {
        #[display("cannot commit to an empty matrix")]
        EmptyMatrix,
        #[display("row {row} has a different length than the first row")]
        RaggedMatrix {
            row: usize,
        },
        #[display("{leaves} leaves do not form a full binary tree")]
        LeafCountNotPowerOfTwo {
            leaves: usize,
        },
        #[display("leaf {index} requested from a tree with {leaves} leaves")]
        QueryOutOfRange {
            index: usize,
            leaves: usize,
        },
    };
}
